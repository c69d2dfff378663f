//! IPC-backed tools offered to the model.
//!
//! Every tool either publishes a request into the `messages`/`tasks` mailboxes
//! for the host to act on, or reads the host-written task snapshot. Results are
//! plain strings fed back to the model; validation problems are reported the
//! same way so the model can correct itself.

use crate::context::RunnerContext;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use runner_core::IpcPaths;
use runner_core::io::publish;
use runner_core::schema::{MessageRequest, TaskControl, TaskRequest, TaskSnapshot};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fs;

const PROMPT_PREVIEW_CHARS: usize = 50;

/// Local ISO-8601 variants accepted for `once` besides the full `T`-separated form
const LOCAL_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Tool set bound to one runner context
#[derive(Debug, Clone)]
pub struct IpcTools {
    ipc: IpcPaths,
    ctx: RunnerContext,
}

#[derive(Deserialize)]
struct SendMessageArgs {
    text: String,
}

#[derive(Deserialize)]
struct ScheduleTaskArgs {
    prompt: String,
    schedule_type: String,
    schedule_value: String,
    #[serde(default)]
    context_mode: Option<String>,
    #[serde(default)]
    target_group_jid: Option<String>,
}

#[derive(Deserialize)]
struct TaskIdArgs {
    task_id: String,
}

#[derive(Deserialize)]
struct RegisterGroupArgs {
    jid: String,
    name: String,
    folder: String,
    trigger: String,
}

enum ControlKind {
    Pause,
    Resume,
    Cancel,
}

impl IpcTools {
    pub fn new(ipc: IpcPaths, ctx: RunnerContext) -> Self {
        Self { ipc, ctx }
    }

    /// Names of the tools available to this context
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = vec![
            "send_message",
            "schedule_task",
            "list_tasks",
            "pause_task",
            "resume_task",
            "cancel_task",
        ];
        if self.ctx.is_main {
            names.push("register_group");
        }
        names
    }

    /// Function-calling definitions in chat-completions `tools` format
    pub fn definitions(&self) -> Vec<Value> {
        let task_id_params = json!({
            "type": "object",
            "properties": {"task_id": {"type": "string", "description": "The task ID."}},
            "required": ["task_id"]
        });

        let mut defs = vec![
            function(
                "send_message",
                "Send a message to the user or group immediately while you're still running. \
                 Use this for progress updates or to send multiple messages. When running as a \
                 scheduled task your final output is NOT sent to the user, so use this tool to \
                 communicate.",
                json!({
                    "type": "object",
                    "properties": {"text": {"type": "string", "description": "The message text to send."}},
                    "required": ["text"]
                }),
            ),
            function(
                "schedule_task",
                "Schedule a recurring or one-time task that runs as a full agent. context_mode \
                 \"group\" runs with chat history, \"isolated\" runs in a fresh session. \
                 schedule_value (local time): cron like \"0 9 * * *\", interval in milliseconds \
                 like \"300000\", or once as a local timestamp like \"2026-02-01T15:30:00\".",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": {"type": "string"},
                        "schedule_type": {"type": "string", "enum": ["cron", "interval", "once"]},
                        "schedule_value": {"type": "string"},
                        "context_mode": {"type": "string", "enum": ["group", "isolated"]},
                        "target_group_jid": {"type": "string", "description": "(Main only) JID of the group to schedule for."}
                    },
                    "required": ["prompt", "schedule_type", "schedule_value"]
                }),
            ),
            function(
                "list_tasks",
                "List scheduled tasks. Main sees all tasks, other groups only their own.",
                json!({"type": "object", "properties": {}}),
            ),
            function("pause_task", "Pause a scheduled task until resumed.", task_id_params.clone()),
            function("resume_task", "Resume a paused task.", task_id_params.clone()),
            function("cancel_task", "Cancel and delete a scheduled task.", task_id_params),
        ];

        if self.ctx.is_main {
            defs.push(function(
                "register_group",
                "Register a new group so the agent responds there. Folder names are lowercase \
                 with hyphens, e.g. \"family-chat\".",
                json!({
                    "type": "object",
                    "properties": {
                        "jid": {"type": "string"},
                        "name": {"type": "string"},
                        "folder": {"type": "string"},
                        "trigger": {"type": "string", "description": "Trigger word, e.g. \"@Andy\"."}
                    },
                    "required": ["jid", "name", "folder", "trigger"]
                }),
            ));
        }
        defs
    }

    /// Execute a tool call from the model
    ///
    /// `arguments` is the raw JSON argument string. Unknown tools and bad
    /// arguments come back as error text, never as a runner failure.
    pub fn dispatch(&self, name: &str, arguments: &str) -> String {
        tracing::info!(tool = name, "tool call");
        let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
        let outcome = match name {
            "send_message" => parse(arguments).map(|a: SendMessageArgs| self.send_message(&a.text)),
            "schedule_task" => parse(arguments).map(|a: ScheduleTaskArgs| {
                self.schedule_task(
                    &a.prompt,
                    &a.schedule_type,
                    &a.schedule_value,
                    a.context_mode.as_deref().unwrap_or("group"),
                    a.target_group_jid.as_deref(),
                )
            }),
            "list_tasks" => Ok(self.list_tasks()),
            "pause_task" => parse(arguments).map(|a: TaskIdArgs| self.pause_task(&a.task_id)),
            "resume_task" => parse(arguments).map(|a: TaskIdArgs| self.resume_task(&a.task_id)),
            "cancel_task" => parse(arguments).map(|a: TaskIdArgs| self.cancel_task(&a.task_id)),
            "register_group" if self.ctx.is_main => parse(arguments).map(|a: RegisterGroupArgs| {
                self.register_group(&a.jid, &a.name, &a.folder, &a.trigger)
            }),
            "register_group" => Ok("Only the main group can register new groups.".to_string()),
            other => Err(format!("Unknown tool: {other}")),
        };
        outcome.unwrap_or_else(|e| format!("Error: {e}"))
    }

    /// Queue a chat message for immediate delivery
    pub fn send_message(&self, text: &str) -> String {
        let request = MessageRequest {
            chat_jid: self.ctx.chat_jid.clone(),
            text: text.to_string(),
            group_folder: self.ctx.group_folder.clone(),
            timestamp: now(),
        };
        match publish(&self.ipc.messages_dir(), &request) {
            Ok(_) => "Message sent.".to_string(),
            Err(e) => format!("Error: failed to send message: {e}"),
        }
    }

    /// Validate and queue a schedule request
    pub fn schedule_task(
        &self,
        prompt: &str,
        schedule_type: &str,
        schedule_value: &str,
        context_mode: &str,
        target_group_jid: Option<&str>,
    ) -> String {
        if let Err(message) = validate_schedule(schedule_type, schedule_value) {
            return message;
        }
        if !matches!(context_mode, "group" | "isolated") {
            return format!(
                "Invalid context_mode: \"{context_mode}\". Must be \"group\" or \"isolated\"."
            );
        }

        let target_jid = match target_group_jid {
            Some(jid) if self.ctx.is_main && !jid.is_empty() => jid.to_string(),
            _ => self.ctx.chat_jid.clone(),
        };

        let request = TaskRequest::ScheduleTask {
            prompt: prompt.to_string(),
            schedule_type: schedule_type.to_string(),
            schedule_value: schedule_value.to_string(),
            context_mode: context_mode.to_string(),
            target_jid,
            created_by: self.ctx.group_folder.clone(),
            timestamp: now(),
        };
        match publish(&self.ipc.tasks_dir(), &request) {
            Ok(name) => format!("Task scheduled ({name}): {schedule_type} - {schedule_value}"),
            Err(e) => format!("Error: failed to schedule task: {e}"),
        }
    }

    /// Format the host's task snapshot, filtered to this group unless main
    pub fn list_tasks(&self) -> String {
        let path = self.ipc.current_tasks_file();
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return "No scheduled tasks found.".to_string();
            }
            Err(e) => return format!("Error reading tasks: {e}"),
        };
        let all: Vec<TaskSnapshot> = match serde_json::from_slice(&content) {
            Ok(all) => all,
            Err(e) => return format!("Error reading tasks: {e}"),
        };

        let lines: Vec<String> = all
            .iter()
            .filter(|t| self.ctx.is_main || t.group_folder.as_deref() == Some(self.ctx.group_folder.as_str()))
            .map(|t| {
                let preview: String = t.prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
                format!(
                    "- [{}] {preview}... ({}: {}) - {}, next: {}",
                    t.id,
                    t.schedule_type,
                    t.schedule_value,
                    t.status,
                    t.next_run.as_deref().filter(|n| !n.is_empty()).unwrap_or("N/A")
                )
            })
            .collect();

        if lines.is_empty() {
            "No scheduled tasks found.".to_string()
        } else {
            format!("Scheduled tasks:\n{}", lines.join("\n"))
        }
    }

    pub fn pause_task(&self, task_id: &str) -> String {
        self.control_task(ControlKind::Pause, task_id)
    }

    pub fn resume_task(&self, task_id: &str) -> String {
        self.control_task(ControlKind::Resume, task_id)
    }

    pub fn cancel_task(&self, task_id: &str) -> String {
        self.control_task(ControlKind::Cancel, task_id)
    }

    /// Queue a group registration (main only)
    pub fn register_group(&self, jid: &str, name: &str, folder: &str, trigger: &str) -> String {
        if !self.ctx.is_main {
            return "Only the main group can register new groups.".to_string();
        }
        let request = TaskRequest::RegisterGroup {
            jid: jid.to_string(),
            name: name.to_string(),
            folder: folder.to_string(),
            trigger: trigger.to_string(),
            timestamp: now(),
        };
        match publish(&self.ipc.tasks_dir(), &request) {
            Ok(_) => format!("Group \"{name}\" registered. It will start receiving messages immediately."),
            Err(e) => format!("Error: failed to register group: {e}"),
        }
    }

    fn control_task(&self, kind: ControlKind, task_id: &str) -> String {
        let control = TaskControl {
            task_id: task_id.to_string(),
            group_folder: self.ctx.group_folder.clone(),
            is_main: self.ctx.is_main,
            timestamp: now(),
        };
        let (request, verb) = match kind {
            ControlKind::Pause => (TaskRequest::PauseTask(control), "pause"),
            ControlKind::Resume => (TaskRequest::ResumeTask(control), "resume"),
            ControlKind::Cancel => (TaskRequest::CancelTask(control), "cancellation"),
        };
        match publish(&self.ipc.tasks_dir(), &request) {
            Ok(_) => format!("Task {task_id} {verb} requested."),
            Err(e) => format!("Error: failed to request task {verb}: {e}"),
        }
    }
}

fn function(name: &str, description: &str, parameters: Value) -> Value {
    json!({
        "type": "function",
        "function": {"name": name, "description": description, "parameters": parameters}
    })
}

fn parse<T: for<'de> Deserialize<'de>>(arguments: &str) -> Result<T, String> {
    serde_json::from_str(arguments).map_err(|e| format!("invalid arguments: {e}"))
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Check `schedule_value` against `schedule_type`, returning model-facing text on failure
fn validate_schedule(schedule_type: &str, schedule_value: &str) -> Result<(), String> {
    match schedule_type {
        "cron" => Ok(()),
        "interval" => match schedule_value.trim().parse::<i64>() {
            Ok(ms) if ms > 0 => Ok(()),
            _ => Err(format!(
                "Invalid interval: \"{schedule_value}\". Must be positive milliseconds (e.g., \"300000\" for 5 min)."
            )),
        },
        "once" => {
            let value = schedule_value.trim();
            let parses = value.parse::<NaiveDateTime>().is_ok()
                || LOCAL_TIMESTAMP_FORMATS
                    .iter()
                    .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
                || DateTime::parse_from_rfc3339(value).is_ok()
                || value.parse::<NaiveDate>().is_ok();
            if parses {
                Ok(())
            } else {
                Err(format!(
                    "Invalid timestamp: \"{schedule_value}\". Use ISO 8601 format like \"2026-02-01T15:30:00\"."
                ))
            }
        }
        other => Err(format!(
            "Invalid schedule_type: \"{other}\". Must be \"cron\", \"interval\", or \"once\"."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn ctx(is_main: bool) -> RunnerContext {
        RunnerContext {
            chat_jid: "own@g.us".to_string(),
            group_folder: "family-chat".to_string(),
            is_main,
            session_id: "sess".to_string(),
            is_scheduled_task: false,
        }
    }

    fn entries(dir: &Path) -> Vec<Value> {
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default();
        paths.sort();
        paths
            .iter()
            .map(|p| serde_json::from_slice(&fs::read(p).unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn test_send_message_publishes_request() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());
        let tools = IpcTools::new(ipc.clone(), ctx(false));

        assert_eq!(tools.send_message("on it"), "Message sent.");

        let written = entries(&ipc.messages_dir());
        assert_eq!(written.len(), 1);
        assert_eq!(written[0]["type"], "message");
        assert_eq!(written[0]["chatJid"], "own@g.us");
        assert_eq!(written[0]["text"], "on it");
        assert_eq!(written[0]["groupFolder"], "family-chat");
        assert!(written[0]["timestamp"].is_string());
    }

    #[test]
    fn test_schedule_task_validation() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());
        let tools = IpcTools::new(ipc.clone(), ctx(false));

        assert!(tools.schedule_task("p", "weekly", "x", "group", None).starts_with("Invalid schedule_type"));
        assert!(tools.schedule_task("p", "interval", "0", "group", None).starts_with("Invalid interval"));
        assert!(tools.schedule_task("p", "interval", "soon", "group", None).starts_with("Invalid interval"));
        assert!(tools.schedule_task("p", "once", "tomorrow", "group", None).starts_with("Invalid timestamp"));
        assert!(tools.schedule_task("p", "cron", "0 9 * * *", "shared", None).starts_with("Invalid context_mode"));
        assert!(entries(&ipc.tasks_dir()).is_empty());

        assert!(tools.schedule_task("p", "once", "2026-02-01T15:30:00", "isolated", None).starts_with("Task scheduled ("));
        assert!(tools.schedule_task("p", "interval", "300000", "group", None).starts_with("Task scheduled ("));
        assert_eq!(entries(&ipc.tasks_dir()).len(), 2);
    }

    #[test]
    fn test_once_accepts_iso_variants() {
        for value in [
            "2026-02-01T15:30:00",
            "2026-02-01T15:30:00.250",
            "2026-02-01T15:30",
            "2026-02-01 15:30:00",
            "2026-02-01 15:30",
            "2026-02-01T15:30:00+02:00",
            "2026-02-01",
        ] {
            assert!(validate_schedule("once", value).is_ok(), "rejected {value}");
        }
        for value in ["2026-02-01T25:00", "02/01/2026 15:30", "tomorrow at 3"] {
            assert!(validate_schedule("once", value).is_err(), "accepted {value}");
        }
    }

    #[test]
    fn test_schedule_task_target_only_for_main() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());

        IpcTools::new(ipc.clone(), ctx(false)).schedule_task("p", "cron", "0 9 * * *", "group", Some("other@g.us"));
        IpcTools::new(ipc.clone(), ctx(true)).schedule_task("p", "cron", "0 9 * * *", "group", Some("other@g.us"));

        let written = entries(&ipc.tasks_dir());
        let targets: Vec<&str> = written.iter().map(|v| v["targetJid"].as_str().unwrap()).collect();
        assert!(targets.contains(&"own@g.us"));
        assert!(targets.contains(&"other@g.us"));
        assert!(written.iter().all(|v| v["type"] == "schedule_task" && v["createdBy"] == "family-chat"));
    }

    #[test]
    fn test_task_controls() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());
        let tools = IpcTools::new(ipc.clone(), ctx(false));

        assert_eq!(tools.pause_task("t1"), "Task t1 pause requested.");
        assert_eq!(tools.resume_task("t1"), "Task t1 resume requested.");
        assert_eq!(tools.cancel_task("t1"), "Task t1 cancellation requested.");

        let mut kinds: Vec<String> = entries(&ipc.tasks_dir())
            .iter()
            .map(|v| {
                assert_eq!(v["taskId"], "t1");
                assert_eq!(v["isMain"], false);
                v["type"].as_str().unwrap().to_string()
            })
            .collect();
        kinds.sort();
        assert_eq!(kinds, vec!["cancel_task", "pause_task", "resume_task"]);
    }

    #[test]
    fn test_register_group_main_only() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());

        let refused = IpcTools::new(ipc.clone(), ctx(false)).register_group("g@g.us", "Fam", "fam", "@Andy");
        assert_eq!(refused, "Only the main group can register new groups.");
        assert!(entries(&ipc.tasks_dir()).is_empty());

        let accepted = IpcTools::new(ipc.clone(), ctx(true)).register_group("g@g.us", "Fam", "fam", "@Andy");
        assert!(accepted.starts_with("Group \"Fam\" registered."));
        let written = entries(&ipc.tasks_dir());
        assert_eq!(written[0]["type"], "register_group");
        assert_eq!(written[0]["trigger"], "@Andy");
    }

    #[test]
    fn test_list_tasks_filters_by_group() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());
        let group_tools = IpcTools::new(ipc.clone(), ctx(false));
        let main_tools = IpcTools::new(ipc.clone(), ctx(true));

        assert_eq!(group_tools.list_tasks(), "No scheduled tasks found.");

        let snapshot = json!([
            {"id": "t1", "prompt": "mine", "schedule_type": "cron", "schedule_value": "0 9 * * *",
             "status": "active", "next_run": "2026-02-01T09:00:00", "groupFolder": "family-chat"},
            {"id": "t2", "prompt": "theirs", "schedule_type": "interval", "schedule_value": "60000",
             "status": "paused", "next_run": null, "groupFolder": "work"}
        ]);
        fs::write(ipc.current_tasks_file(), snapshot.to_string()).unwrap();

        let own = group_tools.list_tasks();
        assert_eq!(
            own,
            "Scheduled tasks:\n- [t1] mine... (cron: 0 9 * * *) - active, next: 2026-02-01T09:00:00"
        );

        let all = main_tools.list_tasks();
        assert!(all.contains("[t1]"));
        assert!(all.contains("- [t2] theirs... (interval: 60000) - paused, next: N/A"));
    }

    #[test]
    fn test_definitions_follow_privilege() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());

        let group = IpcTools::new(ipc.clone(), ctx(false));
        let main = IpcTools::new(ipc, ctx(true));
        let names = |tools: &IpcTools| -> Vec<String> {
            tools
                .definitions()
                .iter()
                .map(|d| d["function"]["name"].as_str().unwrap().to_string())
                .collect()
        };

        assert_eq!(names(&group), group.names());
        assert!(!names(&group).contains(&"register_group".to_string()));
        assert!(names(&main).contains(&"register_group".to_string()));
    }

    #[test]
    fn test_dispatch_routes_and_reports_errors() {
        let temp_dir = TempDir::new().unwrap();
        let ipc = IpcPaths::new(temp_dir.path());
        let tools = IpcTools::new(ipc.clone(), ctx(false));

        assert_eq!(tools.dispatch("send_message", r#"{"text":"hey"}"#), "Message sent.");
        assert_eq!(tools.dispatch("list_tasks", ""), "No scheduled tasks found.");
        assert!(tools.dispatch("send_message", "{}").starts_with("Error: invalid arguments"));
        assert_eq!(tools.dispatch("shell", "{}"), "Error: Unknown tool: shell");
        assert_eq!(
            tools.dispatch("register_group", r#"{"jid":"j","name":"n","folder":"f","trigger":"t"}"#),
            "Only the main group can register new groups."
        );
        assert!(
            tools
                .dispatch("schedule_task", r#"{"prompt":"p","schedule_type":"cron","schedule_value":"* * * * *"}"#)
                .starts_with("Task scheduled (")
        );
        assert_eq!(entries(&ipc.messages_dir()).len(), 1);
    }
}
