// ABOUTME: CommandFilter - denylist of destructive shell command patterns.
// ABOUTME: Commands matching any pattern are rejected before they are spawned.

use regex::RegexSet;

/// Checks commands against a set of blocked patterns.
pub struct CommandFilter {
    patterns: RegexSet,
    reasons: Vec<String>,
}

/// Information about a blocked command.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BlockedCommand {
    pub reason: String,
    pub command: String,
}

impl CommandFilter {
    /// Create a filter from a list of (pattern, reason) tuples.
    /// The RegexSet is compiled once for efficient multi-pattern matching.
    pub fn new(patterns: &[(String, String)]) -> Result<Self, regex::Error> {
        let (regexes, reasons): (Vec<_>, Vec<_>) = patterns.iter().cloned().unzip();
        Ok(Self {
            patterns: RegexSet::new(&regexes)?,
            reasons,
        })
    }

    /// Check a command. Returns the first matching rule, or None if allowed.
    pub fn check(&self, command: &str) -> Option<BlockedCommand> {
        let first = self.patterns.matches(command).into_iter().next()?;
        Some(BlockedCommand {
            reason: self.reasons[first].clone(),
            command: command.to_string(),
        })
    }
}

impl Default for CommandFilter {
    fn default() -> Self {
        // The built-in list is static and covered by tests.
        Self::new(&default_denylist()).expect("default denylist patterns are valid")
    }
}

/// Returns the default denylist of (pattern, reason) tuples.
/// This catches obvious destructive patterns; path containment in the
/// sandbox is the primary defense for file tools.
pub fn default_denylist() -> Vec<(String, String)> {
    vec![
        // Destructive deletion of root-like paths
        (
            r"\brm\s+(?:-\S+\s+)*(?:/\*?|~/?\*?|\$HOME/?\*?)(?:\s|;|&|\||$)".into(),
            "Recursive deletion of a root path".into(),
        ),
        // Disk-level destructive operations
        (r"(?i)\bmkfs(?:\.\w+)?\b".into(), "Filesystem formatting".into()),
        (r"\bdd\s.*\bof=/dev/".into(), "Direct device writes".into()),
        (r">\s*/dev/sd[a-z]".into(), "Direct device writes".into()),
        // Fork bomb
        (r":\(\)\s*\{.*\}".into(), "Fork bomb pattern".into()),
        // System shutdown/reboot
        (
            r"(?i)\b(?:shutdown|reboot|halt|poweroff)\b".into(),
            "System power control".into(),
        ),
        // Permission changes at system level
        (
            r"\bch(?:mod|own)\s.*\s/(?:$|\s|[a-z])".into(),
            "Permission changes at root level".into(),
        ),
        // System directory writes
        (
            r">\s*/(?:etc|usr|boot|sys|proc)/".into(),
            "Write to a system directory".into(),
        ),
        // Privilege escalation
        (r"(?i)\b(?:sudo|doas)\b".into(), "Privilege escalation".into()),
    ]
}
