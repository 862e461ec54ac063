//! Remote shell command construction
//!
//! Remote commands reach the server as a single string interpreted by the
//! remote login shell. Every word that ends up in that string goes through
//! [`quote_words`]; nothing else in the crate builds remote command strings.

use super::ProcessCommandBuilder;

/// Program used to reach remote environments
pub const SSH_PROGRAM: &str = "ssh";

/// Quote each word for a POSIX shell and join them with spaces
pub fn quote_words<S: AsRef<str>>(words: &[S]) -> String {
    shell_words::join(words.iter().map(|w| w.as_ref()))
}

/// A remote environment reachable through `ssh <alias>`
#[derive(Debug, Clone)]
pub struct RemoteShell {
    alias: String,
    root: String,
}

impl RemoteShell {
    pub fn new(alias: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            root: root.into(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Command string executed remotely: change into the root, then run `words`
    pub fn command_string<S: AsRef<str>>(&self, words: &[S]) -> String {
        format!("cd {} && {}", quote_words(&[&self.root]), quote_words(words))
    }

    /// Build the local `ssh` invocation that runs `words` inside the remote root
    pub fn command<S: AsRef<str>>(&self, words: &[S]) -> ProcessCommandBuilder {
        ProcessCommandBuilder::new(SSH_PROGRAM).args([
            self.alias.clone(),
            self.command_string(words),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words_are_not_quoted() {
        let shell = RemoteShell::new("deploy@staging", "/var/www/site");
        assert_eq!(
            shell.command_string(&["wp", "db", "export", "-"]),
            "cd /var/www/site && wp db export -"
        );
    }

    #[test]
    fn test_metacharacters_are_quoted() {
        let shell = RemoteShell::new("staging", "/var/www/my site");
        let cmd = shell.command_string(&["wp", "search-replace", "a.com; rm -rf /", "b.com"]);

        assert_eq!(
            cmd,
            "cd '/var/www/my site' && wp search-replace 'a.com; rm -rf /' b.com"
        );
    }

    #[test]
    fn test_command_targets_alias() {
        let cmd = RemoteShell::new("prod", "/srv")
            .command(&["wp", "db", "import", "-"])
            .build();
        assert_eq!(cmd.program, SSH_PROGRAM);
        assert_eq!(cmd.args[0], "prod");
        assert_eq!(cmd.args[1], "cd /srv && wp db import -");
        assert_eq!(cmd.args.len(), 2);
    }
}
