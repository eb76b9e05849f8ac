use crate::domain::entities::{Command, CommandRegistry};
use crate::application::errors::CommandError;
use super::DiagnosisService;

/// Service for managing and executing commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    /// Register `diagnose`, `info` and `help`
    pub fn register_defaults(&mut self, diagnosis: DiagnosisService) {
        let diagnose = diagnosis.clone();
        self.register(Command::new("diagnose")
            .with_description("Guess which conditions match your symptoms")
            .with_usage("diagnose <symptom> <symptom> ...")
            .with_handler(move |args| Ok(diagnose.diagnose_reply(args))));

        let info_usage = format!("Usage: {}info <disease>", self.prefix);
        self.register(Command::new("info")
            .with_description("Show symptoms and treatments for a disease")
            .with_usage("info <disease>")
            .with_handler(move |args| {
                if args.is_empty() {
                    return Err(CommandError::InvalidArgs(info_usage.clone()));
                }
                Ok(diagnosis.info_reply(args))
            }));

        self.register_help();
    }

    /// Register `help` from a snapshot of the commands registered so far
    pub fn register_help(&mut self) {
        let mut lines: Vec<(String, String)> = self.registry.all()
            .into_iter()
            .filter(|cmd| cmd.name != "help")
            .map(|cmd| (cmd.name.clone(), self.usage_line(cmd)))
            .collect();
        lines.push(("help".to_string(), format!("{}help [command] - Show this message", self.prefix)));
        lines.sort();

        let prefix = self.prefix.clone();
        self.register(Command::new("help")
            .with_description("Show this message")
            .with_usage("help [command]")
            .with_handler(move |args| {
                let Some(wanted) = args.first() else {
                    let mut help = format!("Say `{}diagnose` for me to diagnose something.\nAvailable commands:\n", prefix);
                    for (_, line) in &lines {
                        help.push_str(&format!("  {}\n", line));
                    }
                    return Ok(help.trim_end().to_string());
                };

                let wanted = wanted.trim_start_matches(prefix.as_str());
                Ok(lines.iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                    .map(|(_, line)| line.clone())
                    .unwrap_or_else(|| format!("`{}{}` is not a command. Say `{}help` to list commands.", prefix, wanted, prefix)))
            }));
    }

    /// Run a command. Unknown commands yield `Ok(None)`.
    pub fn handle(&self, name: &str, args: &[String]) -> Result<Option<String>, CommandError> {
        let Some(cmd) = self.registry.find(name) else {
            tracing::debug!("Ignoring unknown command: {}", name);
            return Ok(None);
        };

        match &cmd.handler {
            Some(handler) => handler(args).map(Some),
            None => Err(CommandError::ExecutionFailed(format!("Command {} not implemented", cmd.name))),
        }
    }

    /// Whether `name` is a registered command
    pub fn knows(&self, name: &str) -> bool {
        self.registry.find(name).is_some()
    }

    fn usage_line(&self, cmd: &Command) -> String {
        format!(
            "{}{} - {}",
            self.prefix,
            cmd.usage.as_deref().unwrap_or(&cmd.name),
            cmd.description.as_deref().unwrap_or("No description")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::domain::entities::{DiseaseDatabase, DiseaseRecord};

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn service() -> CommandService {
        let db: DiseaseDatabase = vec![
            DiseaseRecord::new("flu")
                .with_symptoms(["fever", "cough"])
                .with_treatments(["rest"]),
        ]
        .into_iter()
        .collect();

        let mut commands = CommandService::new("?");
        commands.register_defaults(DiagnosisService::new(Arc::new(db)));
        commands
    }

    #[test]
    fn test_routes_diagnose() {
        let reply = service().handle("diagnose", &args(&["fever"])).unwrap().unwrap();
        assert!(reply.starts_with("You might have: flu"));
    }

    #[test]
    fn test_routes_info_ignoring_case() {
        let reply = service().handle("INFO", &args(&["flu"])).unwrap().unwrap();
        assert!(reply.starts_with("Symptoms for flu include"));
    }

    #[test]
    fn test_info_without_name_is_invalid() {
        let err = service().handle("info", &[]).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgs(ref usage) if usage == "Usage: ?info <disease>"));
    }

    #[test]
    fn test_unknown_command_has_no_reply() {
        let commands = service();
        assert!(commands.handle("prescribe", &args(&["flu"])).unwrap().is_none());
        assert!(!commands.knows("prescribe"));
        assert!(commands.knows("Diagnose"));
    }

    #[test]
    fn test_help_lists_commands() {
        let help = service().handle("help", &[]).unwrap().unwrap();

        assert!(help.starts_with("Say `?diagnose` for me to diagnose something."));
        assert!(help.contains("?diagnose <symptom> <symptom> ..."));
        assert!(help.contains("?info <disease> - Show symptoms and treatments for a disease"));
        assert!(help.contains("?help [command]"));
    }

    #[test]
    fn test_help_for_one_command() {
        let commands = service();

        assert_eq!(
            commands.handle("help", &args(&["?info"])).unwrap().unwrap(),
            "?info <disease> - Show symptoms and treatments for a disease"
        );
        assert_eq!(
            commands.handle("help", &args(&["cure"])).unwrap().unwrap(),
            "`?cure` is not a command. Say `?help` to list commands."
        );
        assert_eq!(
            commands.handle("help", &args(&["help"])).unwrap().unwrap(),
            "?help [command] - Show this message"
        );
    }
}
