use std::fmt;

use super::{ObjectTy, Param, Signature, Ty};

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Any => f.write_str("any"),
            Ty::Unknown => f.write_str("unknown"),
            Ty::Never => f.write_str("never"),
            Ty::Void => f.write_str("void"),
            Ty::Undefined => f.write_str("undefined"),
            Ty::Null => f.write_str("null"),
            Ty::String => f.write_str("string"),
            Ty::Number => f.write_str("number"),
            Ty::Boolean => f.write_str("boolean"),
            Ty::BigInt => f.write_str("bigint"),
            Ty::StringLiteral(value) => write!(f, "\"{value}\""),
            Ty::NumberLiteral(value) => f.write_str(value),
            Ty::BooleanLiteral(value) => write!(f, "{value}"),
            Ty::EnumMember { enum_name, member } => write!(f, "{enum_name}.{member}"),
            Ty::Array(inner) => match inner.as_ref() {
                Ty::Union(_) | Ty::Object(_) => write!(f, "({inner})[]"),
                _ => write!(f, "{inner}[]"),
            },
            Ty::Promise(inner) => write!(f, "Promise<{inner}>"),
            Ty::Object(obj) => fmt_object(obj, f),
            Ty::Union(members) => {
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Ty::Named(name) => f.write_str(name),
        }
    }
}

fn fmt_object(obj: &ObjectTy, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(name) = &obj.name {
        return f.write_str(name);
    }
    if obj.properties.is_empty() && obj.call_signatures.len() == 1 {
        let sig = &obj.call_signatures[0];
        return write!(f, "({}) => {}", ParamList(&sig.params), sig.ret);
    }
    f.write_str("{ ")?;
    for prop in &obj.properties {
        let optional = if prop.optional { "?" } else { "" };
        write!(f, "{}{optional}: {}; ", prop.name, prop.ty)?;
    }
    f.write_str("}")
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest {
            f.write_str("...")?;
        }
        f.write_str(&self.name)?;
        if self.optional {
            f.write_str("?")?;
        }
        write!(f, ": {}", self.ty)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}): {}", ParamList(&self.params), self.ret)
    }
}

struct ParamList<'a>(&'a [Param]);

impl fmt::Display for ParamList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, param) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}
