use std::fmt::Write;

#[derive(Debug, Clone)]
struct OptionGuide {
    flag: &'static str,
    description: &'static str,
}

#[derive(Debug, Clone)]
struct CommandGuide {
    names: &'static [&'static str],
    summary: &'static str,
    usage: &'static [&'static str],
    options: &'static [OptionGuide],
    examples: &'static [&'static str],
}

const STORE_OPTION: OptionGuide = OptionGuide {
    flag: "--store <path>",
    description: "Signature store to use; `.json` selects the JSON format (env: MSGCHECK_STORE).",
};

const GLOBAL_OPTIONS: &[OptionGuide] = &[
    OptionGuide {
        flag: "-h, --help",
        description: "Show contextual help information.",
    },
    OptionGuide {
        flag: "--version",
        description: "Print msgcheck version and build metadata.",
    },
    OptionGuide {
        flag: "--log-format <fmt>",
        description: "Log output format: text or json (env: MSGCHECK_LOG_FORMAT).",
    },
    OptionGuide {
        flag: "--log-level <lvl>",
        description: "Log verbosity: error, warn, info, debug, trace (env: MSGCHECK_LOG_LEVEL).",
    },
    OptionGuide {
        flag: "--error-format <fmt>",
        description: "Diagnostic rendering: human, short or json (env: MSGCHECK_ERROR_FORMAT).",
    },
];

const COMMAND_GUIDES: &[CommandGuide] = &[
    CommandGuide {
        names: &["register", "collect"],
        summary: "Record message signatures declared in registration manifests.",
        usage: &["msgcheck register --store <path> <manifest>..."],
        options: &[STORE_OPTION],
        examples: &[
            "msgcheck register --store build/messages.json lib/pengine/pe_output.msg.json",
            "MSGCHECK_STORE=messages.store msgcheck register *.msg.json",
        ],
    },
    CommandGuide {
        names: &["check"],
        summary: "Validate output-message call sites in unit dumps against the store.",
        usage: &["msgcheck check --store <path> [--config <file>] <unit>..."],
        options: &[
            STORE_OPTION,
            OptionGuide {
                flag: "--config <file>",
                description: "YAML settings for the validator (env: MSGCHECK_CONFIG).",
            },
        ],
        examples: &[
            "msgcheck check --store build/messages.json pe_status.unit.json",
            "msgcheck check --store messages.store --error-format short *.unit.json",
        ],
    },
    CommandGuide {
        names: &["signatures", "list"],
        summary: "Print the registered message signatures.",
        usage: &["msgcheck signatures --store <path> [--json]"],
        options: &[
            STORE_OPTION,
            OptionGuide {
                flag: "--json",
                description: "Emit the listing as JSON.",
            },
        ],
        examples: &["msgcheck signatures --store build/messages.json --json"],
    },
    CommandGuide {
        names: &["help"],
        summary: "Show general help or help for a command.",
        usage: &["msgcheck help [command]"],
        options: &[],
        examples: &["msgcheck help check"],
    },
    CommandGuide {
        names: &["version"],
        summary: "Print msgcheck version and build metadata.",
        usage: &["msgcheck version", "msgcheck --version"],
        options: &[],
        examples: &[],
    },
];

pub(crate) fn render_general_help() -> String {
    let mut out = String::new();
    out.push_str("msgcheck: signature registry and call-site checker for output messages\n\n");
    out.push_str("USAGE:\n  msgcheck <command> [options]\n\n");
    out.push_str("COMMANDS:\n");
    for guide in COMMAND_GUIDES {
        let _ = writeln!(out, "  {:11} {}", guide.names[0], guide.summary);
    }
    out.push('\n');
    out.push_str("GLOBAL OPTIONS:\n");
    for option in GLOBAL_OPTIONS {
        let _ = writeln!(out, "  {:22} {}", option.flag, option.description);
    }
    out.push('\n');
    out.push_str("Use `msgcheck help <command>` to view detailed usage and examples.\n");
    out
}

pub(crate) fn render_command_help(topic: &str) -> Option<String> {
    let guide = find_guide(topic)?;
    let mut out = String::new();
    let _ = writeln!(out, "msgcheck {}: {}", guide.names[0], guide.summary);
    out.push('\n');

    out.push_str("USAGE:\n");
    for usage in guide.usage {
        let _ = writeln!(out, "  {usage}");
    }

    if guide.names.len() > 1 {
        out.push('\n');
        out.push_str("ALIASES:\n");
        for alias in &guide.names[1..] {
            let _ = writeln!(out, "  {alias}");
        }
    }

    if !guide.options.is_empty() {
        out.push('\n');
        out.push_str("OPTIONS:\n");
        for option in guide.options {
            let _ = writeln!(out, "  {:22} {}", option.flag, option.description);
        }
    }

    if !guide.examples.is_empty() {
        out.push('\n');
        out.push_str("EXAMPLES:\n");
        for example in guide.examples {
            let _ = writeln!(out, "  {example}");
        }
    }
    Some(out)
}

fn available_topics() -> impl Iterator<Item = &'static str> {
    COMMAND_GUIDES.iter().map(|guide| guide.names[0])
}

pub(crate) fn format_unknown_topic(topic: &str) -> String {
    let mut known = available_topics().collect::<Vec<_>>();
    known.sort_unstable();
    format!(
        "unknown help topic '{topic}'; available commands: {}",
        known.join(", ")
    )
}

fn find_guide(topic: &str) -> Option<&'static CommandGuide> {
    COMMAND_GUIDES.iter().find(|guide| {
        guide
            .names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(topic))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_help_lists_every_command() {
        let help = render_general_help();
        for name in ["register", "check", "signatures", "help", "version"] {
            assert!(help.contains(&format!("  {name}")), "missing {name} in:\n{help}");
        }
        assert!(help.contains("--error-format <fmt>"));
    }

    #[test]
    fn command_help_resolves_aliases() {
        let help = render_command_help("LIST").expect("alias resolves");
        assert!(help.starts_with("msgcheck signatures: "));
        assert!(help.contains("--json"));
        assert!(render_command_help("build").is_none());
    }

    #[test]
    fn unknown_topic_lists_sorted_commands() {
        assert_eq!(
            format_unknown_topic("bogus"),
            "unknown help topic 'bogus'; available commands: check, help, register, signatures, version"
        );
    }
}
