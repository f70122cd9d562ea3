//! Integration tests for mailmatch
//!
//! These tests drive the public API end to end: parsing and re-serializing
//! rules, loading message files, evaluating with real and recording command
//! runners, and persisting rules through the rule manager.

use std::fs;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use mailmatch::matcher::{
    CommandRunner, Evaluator, ParseError, PredicateList, ShellRunner, filter_messages, parse_list,
};
use mailmatch::message::{MessageFormat, MessageInfo, load_messages, parse_csv};
use mailmatch::quicksearch::{QuickSearchState, SearchMode};
use mailmatch::rules::{RuleManager, RuleSet};
use tempfile::TempDir;

const INBOX_CSV: &str = "\
message_id,subject,from,to,size,score,unread,marked,deleted,date,X-Spam-Flag
<1@x>,Quarterly numbers,carol@example.com,team@example.com,2048,10,true,true,false,2024-05-01T09:30:00Z,NO
<2@x>,Cheap pills,spam@spam.example,me@example.com,100,-50,true,false,false,2024-05-20T10:00:00Z,YES
<3@x>,Re: Quarterly numbers,boss@example.com,team@example.com,99,0,false,false,true,2024-05-02T12:00:00Z,NO
<4@x>,Lunch?,dave@example.com,me@example.com,101,3,false,false,false,,NO
";

fn inbox() -> Vec<MessageInfo> {
    parse_csv(INBOX_CSV, b',').unwrap()
}

fn ids<'a>(messages: impl IntoIterator<Item = &'a MessageInfo>) -> Vec<&'a str> {
    messages
        .into_iter()
        .map(|m| m.message_id.as_deref().unwrap_or("-"))
        .collect()
}

struct Recorder(Mutex<Vec<String>>);

impl CommandRunner for Recorder {
    fn run(&self, command: &str, _timeout: Option<Duration>) -> io::Result<Option<i32>> {
        self.0.lock().unwrap().push(command.to_string());
        Ok(Some(0))
    }
}

#[test]
fn test_round_trip_is_semantically_stable() {
    let rules = [
        r#"s "foo""#,
        "s foo & t bar",
        r#"%s "Foo" | ~f "x\"y" | !T"#,
        "ag 30 & al -5 & sg 0 & sl 10 & se -3",
        "Sg 100 | Ss 5 | Se 42",
        r#"H X-Spam-Flag "YES" & %H "Reply To" "a\\b""#,
        r#"s /^re:\s+/ & %b /Order \d+/ & f /a\/b/"#,
        r#"X "grep -q %s %F" | U | N | T | D | r | F | L"#,
        "a | C cc | n group | I irt | x refs | i id | y label | h hdr | b body | B msg",
        "~~U",
    ];

    for rule in rules {
        let first = parse_list(rule).unwrap_or_else(|e| panic!("{rule}: {e}"));
        let text = first.to_string();
        let second: PredicateList = text.parse().unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(first, second, "{rule} -> {text}");
        assert_eq!(second.to_string(), text);
    }
}

#[test]
fn test_malformed_rules_are_errors() {
    assert!(matches!(parse_list("s"), Err(ParseError::MissingOperand { .. })));
    assert!(matches!(
        parse_list(r#"z "x""#),
        Err(ParseError::UnknownKeyword { .. })
    ));
    assert!(matches!(
        parse_list(r#"s "unterminated"#),
        Err(ParseError::Unterminated { .. })
    ));
    assert!(matches!(
        parse_list("U & N | T"),
        Err(ParseError::MixedOperators { .. })
    ));
    assert!(matches!(parse_list("   "), Err(ParseError::Empty)));
}

#[test]
fn test_filter_inbox() {
    let messages = inbox();
    let runner = Recorder(Mutex::new(Vec::new()));
    let evaluator = Evaluator::new(&runner);

    let cases = [
        ("s quarterly", vec!["<1@x>", "<3@x>"]),
        ("%s quarterly", vec![]),
        ("U & ~D", vec!["<1@x>", "<2@x>"]),
        (r#"H X-Spam-Flag "yes" | sl -10"#, vec!["<2@x>"]),
        ("Se 100 | Sg 2000", vec!["<1@x>", "<2@x>"]),
        ("Ss 100", vec!["<3@x>"]),
        ("f /^(carol|boss)@/", vec!["<1@x>", "<3@x>"]),
        ("~s quarterly", vec!["<2@x>", "<4@x>"]),
    ];

    for (rule, expected) in cases {
        let list = parse_list(rule).unwrap();
        let found = filter_messages(&evaluator, &list, &messages, false);
        assert_eq!(ids(found), expected, "{rule}");
    }
    assert!(runner.0.lock().unwrap().is_empty());
}

#[test]
fn test_parallel_filter_matches_sequential() {
    let messages: Vec<MessageInfo> = inbox().into_iter().cycle().take(400).collect();
    let list = parse_list(r#"s /numbers$/ | f /spam\./"#).unwrap();
    let runner = Recorder(Mutex::new(Vec::new()));
    let evaluator = Evaluator::new(&runner);

    let sequential = filter_messages(&evaluator, &list, &messages, false);
    let parallel = filter_messages(&evaluator, &list, &messages, true);
    assert_eq!(sequential.len(), 300);
    assert_eq!(ids(sequential), ids(parallel));
}

#[test]
fn test_execute_receives_substituted_command() {
    let messages = inbox();
    let runner = Recorder(Mutex::new(Vec::new()));
    let evaluator = Evaluator::new(&runner);
    let list = parse_list(r#"D | X "notify '%f' %i""#).unwrap();

    let found = filter_messages(&evaluator, &list, &messages, false);
    assert_eq!(found.len(), 4);
    assert_eq!(
        *runner.0.lock().unwrap(),
        [
            "notify 'carol@example.com' <1@x>",
            "notify 'spam@spam.example' <2@x>",
            "notify 'dave@example.com' <4@x>",
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_execute_with_shell_runner() {
    let dir = TempDir::new().unwrap();
    let hit = dir.path().join("hit.eml");
    let miss = dir.path().join("miss.eml");
    fs::write(&hit, "Subject: x\n\nthe secret word\n").unwrap();
    fs::write(&miss, "Subject: y\n\nnothing here\n").unwrap();

    let message = |path: &std::path::Path| MessageInfo {
        file: Some(path.to_path_buf()),
        ..Default::default()
    };

    let list = parse_list(r#"X "grep -q secret %F""#).unwrap();
    let runner = ShellRunner;
    let evaluator = Evaluator::new(&runner).with_timeout(Some(Duration::from_secs(10)));
    assert!(evaluator.evaluate(&list, &message(&hit)));
    assert!(!evaluator.evaluate(&list, &message(&miss)));

    let negated = parse_list(r#"~X "grep -q secret %F""#).unwrap();
    assert!(evaluator.evaluate(&negated, &message(&miss)));
}

#[test]
fn test_messages_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inbox.json");
    let json = serde_json::to_string(&inbox()).unwrap();
    fs::write(&path, json).unwrap();

    let loaded = load_messages(&path, MessageFormat::from_path(&path)).unwrap();
    assert_eq!(loaded, inbox());
}

#[test]
fn test_saved_rules_flow() {
    let dir = TempDir::new().unwrap();
    let manager = RuleManager::without_backup(dir.path().join("rules.toml"));

    manager
        .create("spam", "Spam flagged upstream".to_string(), r#"H X-Spam-Flag yes"#)
        .unwrap();
    manager.create("todo", String::new(), "T & U").unwrap();
    manager.create("trash", String::new(), "D").unwrap();

    let set = manager.load_rule_set().unwrap();
    let runner = Recorder(Mutex::new(Vec::new()));
    let evaluator = Evaluator::new(&runner);

    let messages = inbox();
    let first: Vec<Option<&str>> = messages
        .iter()
        .map(|m| set.first_match(&evaluator, m).and_then(|r| r.name.as_deref()))
        .collect();
    assert_eq!(first, [Some("todo"), Some("spam"), Some("trash"), None]);

    let export = dir.path().join("rules.txt");
    manager.export(&export, &[]).unwrap();
    let text = fs::read_to_string(&export).unwrap();
    assert!(text.starts_with("# Spam flagged upstream\nspam: H X-Spam-Flag \"yes\"\n"));
    assert_eq!(RuleSet::parse_lines(&text).unwrap(), set);

    let other = RuleManager::without_backup(dir.path().join("other.toml"));
    assert_eq!(other.import(&export, false, false).unwrap(), (3, 0));
    assert_eq!(other.load_rule_set().unwrap(), set);
}

#[test]
fn test_quick_search_over_inbox() {
    let messages = inbox();

    let everything = QuickSearchState::prepare("", SearchMode::Extended);
    assert!(!everything.is_active());
    assert!(messages.iter().all(|m| everything.matches(m)));

    let broken = QuickSearchState::prepare(r#"s "open"#, SearchMode::Extended);
    assert!(!broken.is_active());
    assert!(messages.iter().all(|m| broken.matches(m)));

    let unread_subject = QuickSearchState::prepare("subject numbers & unread", SearchMode::Extended);
    let found: Vec<_> = messages.iter().filter(|m| unread_subject.matches(*m)).collect();
    assert_eq!(ids(found), ["<1@x>"]);

    let old = QuickSearchState::prepare("R & ~D", SearchMode::Extended);
    let found: Vec<_> = messages.iter().filter(|m| old.matches(*m)).collect();
    assert_eq!(ids(found), ["<4@x>"]);

    let from = QuickSearchState::prepare("EXAMPLE.COM", SearchMode::From);
    let found: Vec<_> = messages.iter().filter(|m| from.matches(*m)).collect();
    assert_eq!(ids(found), ["<1@x>", "<3@x>", "<4@x>"]);
}
