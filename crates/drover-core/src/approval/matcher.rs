//! Command pattern matching

/// Trailing character that turns a stored command into a prefix pattern
pub const WILDCARD_SUFFIX: char = '*';

/// Command separators and substitutions that disable wildcard matching
const CHAINING_TOKENS: [&str; 7] = ["&&", "||", ";", "|", "`", "$(", "\n"];

/// Check whether a stored command pattern covers `command`.
///
/// An exact string match always wins. Otherwise a pattern ending in
/// [`WILDCARD_SUFFIX`] matches any command that starts with the text before
/// the suffix, so `npm *` matches `npm test` but not `npmx install`.
/// Wildcards never match commands that chain or substitute other commands.
pub fn command_matches(pattern: &str, command: &str) -> bool {
    let command = command.trim();
    let pattern = pattern.trim();

    if pattern == command {
        return true;
    }

    let Some(prefix) = pattern.strip_suffix(WILDCARD_SUFFIX) else {
        return false;
    };

    if CHAINING_TOKENS.iter().any(|token| command.contains(token)) {
        return false;
    }

    command.starts_with(prefix)
}
