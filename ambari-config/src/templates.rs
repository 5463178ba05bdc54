// Rendering of a commented `conf.yaml.example` from the schema document
use crate::error::{ConfigError, Result};
use crate::schema::{OptionSpec, SchemaDocument, Scope};
use serde_json::{json, Value};
use std::fmt::Write as _;

const OPTION_INDENT: &str = "    ";
const ITEM_PREFIX: &str = "  - ";

/// Renders a schema as an example configuration file.
///
/// Required instance options are left uncommented so that the output, as is,
/// is a loadable configuration document.
#[derive(Debug, Clone)]
pub struct ConfigTemplate {
    include_logs: bool,
}

impl Default for ConfigTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTemplate {
    pub fn new() -> Self {
        Self { include_logs: true }
    }

    pub fn without_logs(mut self) -> Self {
        self.include_logs = false;
        self
    }

    pub fn render(&self, schema: &SchemaDocument) -> Result<String> {
        let mut out = String::new();

        out.push_str("## All options defined here are available to all instances.\n#\ninit_config:\n");
        for option in schema.options_by_priority(Scope::InitConfig) {
            out.push('\n');
            render_option(&mut out, option, false)?;
        }

        out.push_str("\n## Every instance is scheduled independently of the others.\n#\ninstances:\n");
        let mut item_started = false;
        let mut block = String::new();
        for option in schema.options_by_priority(Scope::Instances) {
            block.push('\n');
            item_started |= render_option(&mut block, option, !item_started)?;
        }
        if !item_started {
            out.push_str("  -\n");
        }
        out.push_str(&block);

        if self.include_logs && !schema.logs.is_empty() {
            out.push('\n');
            render_logs(&mut out, schema)?;
        }

        Ok(out)
    }
}

/// Writes one option; returns whether it opened the instance list item
fn render_option(out: &mut String, option: &OptionSpec, open_item: bool) -> Result<bool> {
    let _ = writeln!(out, "{}## {}", OPTION_INDENT, param_line(option));
    for line in option.description.trim_end().lines() {
        if line.trim().is_empty() {
            let _ = writeln!(out, "{}##", OPTION_INDENT);
        } else {
            let _ = writeln!(out, "{}## {}", OPTION_INDENT, line);
        }
    }
    let _ = writeln!(out, "{}#", OPTION_INDENT);

    let example = option
        .value
        .example
        .clone()
        .or_else(|| option.value.default.clone())
        .unwrap_or_else(|| Value::String(format!("<{}>", option.name.to_uppercase())));
    let mut entry = serde_json::Map::new();
    entry.insert(option.name.clone(), example);
    let yaml = to_yaml(&Value::Object(entry))?;

    let mut opened = false;
    for line in yaml.lines() {
        if !option.required {
            let _ = writeln!(out, "{}# {}", OPTION_INDENT, line);
        } else if open_item && !opened {
            let _ = writeln!(out, "{}{}", ITEM_PREFIX, line);
            opened = true;
        } else {
            let _ = writeln!(out, "{}{}", OPTION_INDENT, line);
        }
    }
    Ok(opened)
}

fn param_line(option: &OptionSpec) -> String {
    let mut line = format!(
        "@param {} - {} - {}",
        option.name,
        option.value.type_label(),
        if option.required { "required" } else { "optional" }
    );
    if let Some(default) = &option.value.default {
        match default {
            Value::String(text) => {
                let _ = write!(line, " - default: {}", text);
            }
            other => {
                let _ = write!(line, " - default: {}", other);
            }
        }
    }
    line
}

fn render_logs(out: &mut String, schema: &SchemaDocument) -> Result<()> {
    out.push_str(concat!(
        "## Log Section\n",
        "##\n",
        "## type - required - Type of log input source (tcp / udp / file).\n",
        "## port / path - required - Set port if type is tcp or udp. Set path if type is file.\n",
        "## service - required - The name of the service owning the log.\n",
        "## source - required - The integration the log belongs to.\n",
        "## log_processing_rules - optional - Rules applied to lines before they become records,\n",
        "##                                   e.g. `multi_line` to join a stack trace to its first line.\n",
        "#\n",
    ));
    let yaml = to_yaml(&json!({ "logs": schema.default_logs() }))?;
    for line in yaml.lines() {
        let _ = writeln!(out, "# {}", line);
    }
    Ok(())
}

fn to_yaml(value: &Value) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| ConfigError::InternalError(e.into()))
}
