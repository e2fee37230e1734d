/// One protocol line split into its verb and raw argument. Has no identity
/// beyond its value; handlers validate their own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub verb: String,
    pub arg: String,
}

/// Splits a raw control line at the first space. The verb is upper-cased;
/// the argument is passed through untouched. Empty input yields an empty
/// verb and argument.
pub fn parse_command_line(line: &str) -> ParsedCommand {
    let line = line.trim();
    match line.split_once(' ') {
        Some((verb, arg)) => ParsedCommand {
            verb: verb.to_ascii_uppercase(),
            arg: arg.to_string(),
        },
        None => ParsedCommand {
            verb: line.to_ascii_uppercase(),
            arg: String::new(),
        },
    }
}
