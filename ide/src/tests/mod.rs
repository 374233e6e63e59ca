mod completion_dsl;

mod test_rules;
mod test_settings;
