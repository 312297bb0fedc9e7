//! The four single-shot action panels.
//!
//! Every panel follows the same shape: read its fields, refuse to send when
//! a required one is blank, show a processing message, send one request and
//! replace the message with the reply or an error. Only the endpoint, the
//! fields and the localized strings differ, so they live in [`ActionKind`].

use std::fmt;
use std::str::FromStr;

use crate::client::ApiError;
use crate::core::chat::ERROR_PREFIX;
use crate::core::input::TextInput;
use crate::logging;
use crate::models::ActionRequest;

// === Language ===

/// Target language offered by the code panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    TypeScript,
    Java,
    CSharp,
    Go,
    Rust,
    Cpp,
    Php,
    Ruby,
    Sql,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::CSharp,
        Language::Go,
        Language::Rust,
        Language::Cpp,
        Language::Php,
        Language::Ruby,
        Language::Sql,
    ];

    /// Value sent in the `language` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Cpp => "cpp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Sql => "sql",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Cpp => "C++",
            Language::Php => "PHP",
            Language::Ruby => "Ruby",
            Language::Sql => "SQL",
        }
    }

    pub fn next(self) -> Language {
        let index = self.position();
        Language::ALL[(index + 1) % Language::ALL.len()]
    }

    pub fn previous(self) -> Language {
        let len = Language::ALL.len();
        Language::ALL[(self.position() + len - 1) % len]
    }

    fn position(self) -> usize {
        Language::ALL
            .iter()
            .position(|lang| *lang == self)
            .unwrap_or(0)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "js" => "javascript",
            "ts" => "typescript",
            "c#" | "cs" => "csharp",
            "c++" => "cpp",
            "golang" => "go",
            "py" => "python",
            other => other,
        };
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == alias)
            .ok_or_else(|| {
                let known: Vec<&str> = Language::ALL.iter().map(|l| l.as_str()).collect();
                format!("unknown language '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

// === Action Kinds ===

/// A text field on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub multiline: bool,
}

const DOCUMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        label: "Texto do documento",
        multiline: true,
    },
    FieldSpec {
        label: "Pergunta",
        multiline: false,
    },
];

const CODE_GENERATION_FIELDS: &[FieldSpec] = &[FieldSpec {
    label: "Descrição",
    multiline: true,
}];

const CODE_REVIEW_FIELDS: &[FieldSpec] = &[FieldSpec {
    label: "Código",
    multiline: true,
}];

const DATA_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        label: "Dados (CSV, JSON ou texto)",
        multiline: true,
    },
    FieldSpec {
        label: "Análise solicitada",
        multiline: false,
    },
];

/// Which backend action a panel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Document,
    CodeGeneration,
    CodeReview,
    Data,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Document,
        ActionKind::CodeGeneration,
        ActionKind::CodeReview,
        ActionKind::Data,
    ];

    /// Text fields in focus order. Code panels add a language selector after
    /// them.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            ActionKind::Document => DOCUMENT_FIELDS,
            ActionKind::CodeGeneration => CODE_GENERATION_FIELDS,
            ActionKind::CodeReview => CODE_REVIEW_FIELDS,
            ActionKind::Data => DATA_FIELDS,
        }
    }

    pub fn has_language(self) -> bool {
        matches!(self, ActionKind::CodeGeneration | ActionKind::CodeReview)
    }

    pub fn validation_message(self) -> &'static str {
        match self {
            ActionKind::Document => "Por favor, forneça o texto do documento e uma pergunta.",
            ActionKind::CodeGeneration => "Por favor, descreva o que o código deve fazer.",
            ActionKind::CodeReview => "Por favor, forneça o código para revisar.",
            ActionKind::Data => "Por favor, forneça os dados e a análise solicitada.",
        }
    }

    pub fn processing_message(self) -> &'static str {
        match self {
            ActionKind::Document => "Analisando documento...",
            ActionKind::CodeGeneration => "Gerando código...",
            ActionKind::CodeReview => "Revisando código...",
            ActionKind::Data => "Analisando dados...",
        }
    }

    /// Shown after `Erro: ` when the server gives no detail.
    pub fn fallback_message(self) -> &'static str {
        match self {
            ActionKind::Document => "Erro ao analisar documento",
            ActionKind::CodeGeneration => "Erro ao gerar código",
            ActionKind::CodeReview => "Erro ao revisar código",
            ActionKind::Data => "Erro ao analisar dados",
        }
    }

    /// Name used in diagnostic logs.
    pub fn log_label(self) -> &'static str {
        match self {
            ActionKind::Document => "Document analysis",
            ActionKind::CodeGeneration => "Code generation",
            ActionKind::CodeReview => "Code review",
            ActionKind::Data => "Data analysis",
        }
    }
}

// === Panel State ===

/// Where the result area stands after the latest invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    Hidden,
    Invalid,
    Processing,
    Done,
    Failed,
}

/// A request built from the panel fields plus the ticket its reply carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTurn {
    pub kind: ActionKind,
    pub ticket: u64,
    pub request: ActionRequest,
}

/// State of one action panel: its inputs and its single result area.
#[derive(Debug, Clone)]
pub struct ActionPanel {
    kind: ActionKind,
    inputs: Vec<TextInput>,
    language: Language,
    focus: usize,
    result: Option<String>,
    state: ResultState,
    latest_ticket: u64,
}

impl ActionPanel {
    pub fn new(kind: ActionKind, language: Language) -> Self {
        Self {
            kind,
            inputs: vec![TextInput::new(); kind.fields().len()],
            language,
            focus: 0,
            result: None,
            state: ResultState::Hidden,
            latest_ticket: 0,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn input(&self, index: usize) -> Option<&TextInput> {
        self.inputs.get(index)
    }

    /// Replace the contents of a text field.
    pub fn set_field(&mut self, index: usize, value: impl Into<String>) {
        if let Some(input) = self.inputs.get_mut(index) {
            input.set_text(value);
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Text currently in the result area, if it has been shown.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn state(&self) -> ResultState {
        self.state
    }

    // === Focus ===

    /// Number of focusable controls (text fields plus the language selector).
    pub fn focus_count(&self) -> usize {
        self.inputs.len() + usize::from(self.kind.has_language())
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.focus_count();
    }

    pub fn focus_previous(&mut self) {
        let count = self.focus_count();
        self.focus = (self.focus + count - 1) % count;
    }

    pub fn language_focused(&self) -> bool {
        self.kind.has_language() && self.focus == self.inputs.len()
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        self.inputs.get_mut(self.focus)
    }

    pub fn focused_spec(&self) -> Option<FieldSpec> {
        self.kind.fields().get(self.focus).copied()
    }

    // === Actions ===

    /// Validate the fields and, when they are all present, switch the result
    /// area to the processing message and return the request to send.
    pub fn run(&mut self) -> Option<ActionTurn> {
        let Some(request) = self.build_request() else {
            self.show(ResultState::Invalid, self.kind.validation_message());
            return None;
        };

        self.show(ResultState::Processing, self.kind.processing_message());
        self.latest_ticket += 1;
        Some(ActionTurn {
            kind: self.kind,
            ticket: self.latest_ticket,
            request,
        })
    }

    /// Apply a reply. Replies for anything but the latest invocation are
    /// dropped so an older response never overwrites a newer one.
    pub fn complete(&mut self, ticket: u64, result: Result<String, ApiError>) -> bool {
        if ticket != self.latest_ticket || self.state != ResultState::Processing {
            logging::warn(format!(
                "{}: ignoring stale reply (ticket {ticket}, latest {})",
                self.kind.log_label(),
                self.latest_ticket
            ));
            return false;
        }

        match result {
            Ok(content) => self.show(ResultState::Done, content),
            Err(err) => {
                logging::error(format!("{} error: {err}", self.kind.log_label()));
                let text = format!(
                    "{ERROR_PREFIX}{}",
                    err.reason(self.kind.fallback_message())
                );
                self.show(ResultState::Failed, text);
            }
        }
        true
    }

    fn show(&mut self, state: ResultState, text: impl Into<String>) {
        self.state = state;
        self.result = Some(text.into());
    }

    fn build_request(&self) -> Option<ActionRequest> {
        if self.inputs.iter().any(TextInput::is_blank) {
            return None;
        }
        let field = |index: usize| self.inputs[index].trimmed().to_string();
        let language = self.language.as_str().to_string();

        Some(match self.kind {
            ActionKind::Document => ActionRequest::Document {
                document_text: field(0),
                query: field(1),
            },
            ActionKind::CodeGeneration => ActionRequest::CodeGeneration {
                description: field(0),
                language,
            },
            ActionKind::CodeReview => ActionRequest::CodeReview {
                code: field(0),
                language,
            },
            ActionKind::Data => ActionRequest::Data {
                data: field(0),
                query: field(1),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn filled(kind: ActionKind) -> ActionPanel {
        let mut panel = ActionPanel::new(kind, Language::Python);
        for index in 0..kind.fields().len() {
            panel.set_field(index, format!("  valor {index}  "));
        }
        panel
    }

    #[test]
    fn every_panel_refuses_blank_required_fields() {
        for kind in ActionKind::ALL {
            for blank in 0..kind.fields().len() {
                let mut panel = filled(kind);
                panel.set_field(blank, "   ");
                assert_eq!(panel.run(), None, "{kind:?} field {blank}");
                assert_eq!(panel.result(), Some(kind.validation_message()));
                assert_eq!(panel.state(), ResultState::Invalid);
            }
        }
    }

    #[test]
    fn run_shows_processing_and_trims_fields() {
        let mut panel = filled(ActionKind::Document);
        let turn = panel.run().expect("request");

        assert_eq!(panel.result(), Some("Analisando documento..."));
        assert_eq!(
            turn.request,
            ActionRequest::Document {
                document_text: "valor 0".to_string(),
                query: "valor 1".to_string(),
            }
        );
    }

    #[test]
    fn code_panels_send_selected_language() {
        let mut panel = filled(ActionKind::CodeReview);
        panel.set_language(Language::Rust);
        let turn = panel.run().expect("request");
        assert_eq!(
            turn.request,
            ActionRequest::CodeReview {
                code: "valor 0".to_string(),
                language: "rust".to_string(),
            }
        );
    }

    #[test]
    fn success_shows_content_verbatim() {
        let mut panel = filled(ActionKind::Data);
        let turn = panel.run().expect("request");
        assert!(panel.complete(turn.ticket, Ok("  X\n".to_string())));
        assert_eq!(panel.result(), Some("  X\n"));
        assert_eq!(panel.state(), ResultState::Done);
    }

    #[test]
    fn failure_uses_detail_or_panel_fallback() {
        for kind in ActionKind::ALL {
            let mut panel = filled(kind);
            let turn = panel.run().expect("request");
            let err = ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: Some("Y".to_string()),
            };
            panel.complete(turn.ticket, Err(err));
            assert_eq!(panel.result(), Some("Erro: Y"));

            let turn = panel.run().expect("request");
            let err = ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: None,
            };
            panel.complete(turn.ticket, Err(err));
            assert_eq!(
                panel.result().map(str::to_string),
                Some(format!("Erro: {}", kind.fallback_message()))
            );
            assert_eq!(panel.state(), ResultState::Failed);
        }
    }

    #[test]
    fn stale_reply_does_not_overwrite_newer_run() {
        let mut panel = filled(ActionKind::CodeGeneration);
        let first = panel.run().expect("first");
        let second = panel.run().expect("second");

        assert!(!panel.complete(first.ticket, Ok("antigo".to_string())));
        assert_eq!(panel.result(), Some("Gerando código..."));

        assert!(panel.complete(second.ticket, Ok("novo".to_string())));
        assert!(!panel.complete(first.ticket, Ok("antigo".to_string())));
        assert_eq!(panel.result(), Some("novo"));
    }

    #[test]
    fn focus_cycles_through_language_selector() {
        let mut panel = ActionPanel::new(ActionKind::CodeGeneration, Language::Python);
        assert_eq!(panel.focus_count(), 2);
        assert!(!panel.language_focused());
        panel.focus_next();
        assert!(panel.language_focused());
        panel.focus_next();
        assert_eq!(panel.focus(), 0);
        panel.focus_previous();
        assert!(panel.language_focused());

        let panel = ActionPanel::new(ActionKind::Data, Language::Python);
        assert_eq!(panel.focus_count(), 2);
        assert!(!panel.language_focused());
    }

    #[test]
    fn language_parses_aliases_and_cycles() {
        assert_eq!("TS".parse::<Language>(), Ok(Language::TypeScript));
        assert_eq!("c#".parse::<Language>(), Ok(Language::CSharp));
        assert!("cobol".parse::<Language>().is_err());
        assert_eq!(Language::Sql.next(), Language::Python);
        assert_eq!(Language::Python.previous(), Language::Sql);
    }
}
