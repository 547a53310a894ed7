//! Tests for the parser module

use super::*;

#[test]
fn blank_comment_and_label_lines() {
    assert_eq!(parse_line("").unwrap(), Command::Empty);
    assert_eq!(parse_line("   \t").unwrap(), Command::Empty);
    assert_eq!(parse_line("// a note").unwrap(), Command::Comment);
    assert_eq!(parse_line("# heading").unwrap(), Command::Comment);

    match parse_line("chapter1:").unwrap() {
        Command::Label { name } => assert_eq!(name, "chapter1"),
        other => panic!("Expected Label, got {other:?}"),
    }
}

#[test]
fn commands_are_case_insensitive() {
    assert_eq!(parse_line("END").unwrap(), Command::End);
    assert_eq!(parse_line("Cls").unwrap(), Command::Clear);
    assert_eq!(parse_line("clean").unwrap(), Command::Clear);
}

#[test]
fn unknown_command_is_kept_for_reporting() {
    match parse_line("dance wildly").unwrap() {
        Command::Unknown { command } => assert_eq!(command, "dance"),
        other => panic!("Expected Unknown, got {other:?}"),
    }
}

#[test]
fn say_quoted_with_trailing_params() {
    match parse_line(r#"say "Hello, ${name}!" 1.5 red"#).unwrap() {
        Command::Say(args) => {
            assert_eq!(args.text, "Hello, ${name}!");
            assert_eq!(args.seconds, 1.5);
            assert_eq!(args.color, TextColor::Red);
        }
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_colour_in_capitals() {
    match parse_line(r#"say "hi" RED"#).unwrap() {
        Command::Say(args) => {
            assert_eq!(args.text, "hi");
            assert_eq!(args.color, TextColor::Red);
        }
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_quoted_with_leading_params() {
    match parse_line(r#"say blue 2 "The sky""#).unwrap() {
        Command::Say(args) => {
            assert_eq!(args.text, "The sky");
            assert_eq!(args.seconds, 2.0);
            assert_eq!(args.color, TextColor::Blue);
        }
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_defaults() {
    match parse_line(r#"say "plain""#).unwrap() {
        Command::Say(args) => {
            assert_eq!(args.color, TextColor::White);
            assert_eq!(args.seconds, DEFAULT_SAY_SECONDS);
        }
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_escapes() {
    match parse_line(r#"say "a \"b\"\nc\\d \q""#).unwrap() {
        Command::Say(args) => assert_eq!(args.text, "a \"b\"\nc\\d \\q"),
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_missing_quote_reports_column() {
    let err = parse_line(r#"say "never closed"#).unwrap_err();
    assert_eq!(
        err,
        ScriptError::MissingQuote {
            command: "say".to_string(),
            column: 5,
        }
    );
}

#[test]
fn say_legacy_unquoted_form() {
    match parse_line("say It is late 1 yellow").unwrap() {
        Command::Say(args) => {
            assert_eq!(args.text, "It is late");
            assert_eq!(args.seconds, 1.0);
            assert_eq!(args.color, TextColor::Yellow);
        }
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_legacy_takes_only_the_last_number() {
    match parse_line("say Room 101 is empty 0.2").unwrap() {
        Command::Say(args) => {
            assert_eq!(args.text, "Room 101 is empty");
            assert_eq!(args.seconds, 0.2);
        }
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn say_with_words_before_quote_is_legacy_text() {
    match parse_line(r#"say Then "she" left"#).unwrap() {
        Command::Say(args) => assert_eq!(args.text, r#"Then "she" left"#),
        other => panic!("Expected Say, got {other:?}"),
    }
}

#[test]
fn empty_say_is_a_no_op() {
    assert_eq!(parse_line("say   ").unwrap(), Command::Empty);
}

#[test]
fn sayvar_params() {
    match parse_line("sayvar gold 1 green").unwrap() {
        Command::SayVar {
            name,
            color,
            seconds,
        } => {
            assert_eq!(name, "gold");
            assert_eq!(color, TextColor::Green);
            assert_eq!(seconds, 1.0);
        }
        other => panic!("Expected SayVar, got {other:?}"),
    }

    assert!(matches!(
        parse_line("sayvar gold fast"),
        Err(ScriptError::Malformed { .. })
    ));
}

#[test]
fn wait_requires_milliseconds() {
    assert_eq!(parse_line("wait 250").unwrap(), Command::Wait { millis: 250 });
    assert!(matches!(
        parse_line("wait soon"),
        Err(ScriptError::Malformed { .. })
    ));
    assert!(matches!(parse_line("wait"), Err(ScriptError::Malformed { .. })));
}

#[test]
fn endname_keeps_inner_spaces() {
    assert_eq!(
        parse_line("endname   The Good Ending \r").unwrap(),
        Command::EndName {
            name: "The Good Ending".to_string()
        }
    );
    assert!(parse_line("endname").is_err());
}

#[test]
fn input_with_prompt_and_variable() {
    assert_eq!(
        parse_line(r#"input "What is your name? " player"#).unwrap(),
        Command::Input {
            prompt: "What is your name? ".to_string(),
            var: "player".to_string(),
        }
    );
    assert_eq!(
        parse_line("input player").unwrap(),
        Command::Input {
            prompt: String::new(),
            var: "player".to_string(),
        }
    );
}

#[test]
fn input_errors() {
    assert!(matches!(
        parse_line(r#"input "Name? player"#),
        Err(ScriptError::MissingQuote { column: 7, .. })
    ));
    assert!(matches!(
        parse_line(r#"input "Name?""#),
        Err(ScriptError::Malformed { .. })
    ));
}

#[test]
fn choose_options() {
    match parse_line("choose 3 a:Yes b:No maybe").unwrap() {
        Command::Choose { options } => {
            assert_eq!(options.len(), 3);
            assert_eq!(options[0].label, "a");
            assert_eq!(options[0].text, "Yes");
            assert_eq!(options[2].label, "maybe");
            assert_eq!(options[2].text, "maybe");
        }
        other => panic!("Expected Choose, got {other:?}"),
    }
}

#[test]
fn choose_uses_at_most_n_options() {
    match parse_line("choose 1 a:Yes b:No").unwrap() {
        Command::Choose { options } => assert_eq!(options.len(), 1),
        other => panic!("Expected Choose, got {other:?}"),
    }
    match parse_line("choose 4 a:Yes").unwrap() {
        Command::Choose { options } => assert_eq!(options.len(), 1),
        other => panic!("Expected Choose, got {other:?}"),
    }
    assert!(parse_line("choose 2").is_err());
    assert!(parse_line("choose x a:Yes").is_err());
}

#[test]
fn set_and_random() {
    assert_eq!(
        parse_line("set hp -= 3").unwrap(),
        Command::Set {
            var: "hp".to_string(),
            op: SetOp::Subtract,
            value: 3,
        }
    );
    assert_eq!(
        parse_line("random roll 6 1").unwrap(),
        Command::Random {
            var: "roll".to_string(),
            min: 6,
            max: 1,
        }
    );
}

#[test]
fn set_errors() {
    assert_eq!(
        parse_line("set hp %= 3").unwrap_err(),
        ScriptError::InvalidOperator {
            op: "%=".to_string()
        }
    );
    assert!(matches!(
        parse_line("set hp = lots"),
        Err(ScriptError::Malformed { .. })
    ));
    assert!(matches!(
        parse_line("random roll 1"),
        Err(ScriptError::Malformed { .. })
    ));
}

#[test]
fn if_splits_at_last_whitespace() {
    assert_eq!(
        parse_line("if hp > 5 && gold >= 10   win").unwrap(),
        Command::If {
            condition: "hp > 5 && gold >= 10".to_string(),
            target: "win".to_string(),
        }
    );
    assert!(matches!(
        parse_line("if win"),
        Err(ScriptError::Malformed { .. })
    ));
}

#[test]
fn plugin_with_quoted_args() {
    assert_eq!(
        parse_line(r#"runplugin AiChat "--log $log --name ${player}""#).unwrap(),
        Command::Plugin {
            name: "AiChat".to_string(),
            args: "--log $log --name ${player}".to_string(),
        }
    );
    assert_eq!(
        parse_line("plugin Clock").unwrap(),
        Command::Plugin {
            name: "Clock".to_string(),
            args: String::new(),
        }
    );
    assert!(matches!(
        parse_line(r#"plugin Clock "oops"#),
        Err(ScriptError::MissingQuote { column: 14, .. })
    ));
}

#[test]
fn use_with_optional_version() {
    assert_eq!(
        parse_line("use AiChat 1.2").unwrap(),
        Command::Use {
            name: "AiChat".to_string(),
            version: Some("1.2".to_string()),
        }
    );
    assert_eq!(
        parse_line("use AiChat").unwrap(),
        Command::Use {
            name: "AiChat".to_string(),
            version: None,
        }
    );
}

#[test]
fn declared_endings_are_unique_and_ordered() {
    let lines = [
        "say hi",
        "endname Good End",
        "  ENDNAME Bad End\r",
        "endname Good End",
        "endname   ",
    ];
    assert_eq!(declared_endings(&lines), vec!["Good End", "Bad End"]);
}

#[test]
fn scan_quoted_returns_remainder() {
    let quoted = scan_quoted(r#"abc" tail"#).unwrap();
    assert_eq!(quoted.text, "abc");
    assert_eq!(quoted.remainder, " tail");
    assert!(scan_quoted(r#"abc\""#).is_none());
}
