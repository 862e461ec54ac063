use std::path::Path;

use crate::subprocess::ProcessCommand;

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand {
                program: program.to_string(),
                args: Vec::new(),
                working_dir: None,
                stdout_file: None,
                inherit_output: false,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.command.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Redirect stdout into a freshly created file. The file must not exist yet.
    pub fn stdout_to_file(mut self, path: &Path) -> Self {
        self.command.stdout_file = Some(path.to_path_buf());
        self
    }

    /// Let the child write straight to the operator's terminal
    pub fn inherit_output(mut self) -> Self {
        self.command.inherit_output = true;
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builder_collects_args_and_redirect() {
        let cmd = ProcessCommandBuilder::new("wp")
            .args(["db", "export"])
            .arg("-")
            .current_dir(Path::new("/srv/site"))
            .stdout_to_file(Path::new("/tmp/out.sql"))
            .build();

        assert_eq!(cmd.program, "wp");
        assert_eq!(cmd.args, vec!["db", "export", "-"]);
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/srv/site")));
        assert_eq!(cmd.stdout_file, Some(PathBuf::from("/tmp/out.sql")));
        assert!(!cmd.inherit_output);
    }
}
