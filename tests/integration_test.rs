use ripple::core::{MatchType, Usage};
use ripple::error::HistoryError;
use ripple::format::render;
use ripple::git::LastChange;
use ripple::utils::analysis::RiskTier;
use ripple::{AnalysisError, CancelToken, Locale, OutputFormat, RippleConfig, ScanRequest, analyze};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn run_analysis(root: &Path, target: &str, symbol: Option<&str>) -> Result<ripple::ImpactReport, AnalysisError> {
    let request = ScanRequest::new(root.join(target), symbol.map(str::to_string), root);
    analyze(&request, &RippleConfig::default(), &CancelToken::new(), None)
}

#[test]
fn test_filename_reference_scenario() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "a.js", "");
    write(root, "b.js", "import './a.js'");
    write(root, "c.js", "foo();\n");

    let report = run_analysis(root, "a.js", None)?;

    let names: Vec<String> = report.impacts.iter().map(|i| i.file_name()).collect();
    assert_eq!(names, vec!["b.js"]);
    assert_eq!(report.impacts[0].usage, Usage::Direct);
    assert_eq!(report.impacts[0].line_numbers(), vec![1]);
    assert_eq!(report.risk, RiskTier::Medium);
    assert_eq!(report.symbol_file_count, None);
    assert_eq!(report.scanned_files, 2);
    Ok(())
}

#[test]
fn test_contextual_method_call_scenario() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "widget.js", "export class Widget {\n  render() {}\n}\n");
    write(
        root,
        "page.js",
        "import { Widget } from './widget.js';\nconst widget = new Widget();\nwidget.render();\n",
    );
    write(root, "chart.js", "chart.render();\n");

    let report = run_analysis(root, "widget.js", Some("render"))?;

    assert_eq!(report.declaring_context.as_deref(), Some("Widget"));

    let page = report.get(&root.canonicalize()?.join("page.js")).unwrap();
    assert_eq!(page.usage, Usage::Direct);
    assert!(page.is_high_confidence);
    assert_eq!(page.line_numbers(), vec![1, 3]);
    assert_eq!(page.matches[1].match_type, MatchType::MethodCall);
    assert_eq!(page.matches[1].call_context, "widget");

    let chart = report.get(&root.canonicalize()?.join("chart.js")).unwrap();
    assert_eq!(chart.usage, Usage::Indirect);
    assert!(!chart.is_high_confidence);

    // Only the contextual file counts once one exists
    assert_eq!(report.symbol_file_count, Some(1));
    assert_eq!(report.risk, RiskTier::Medium);
    Ok(())
}

#[test]
fn test_outside_repository_still_reports() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "a.js", "");
    write(root, "b.js", "import './a.js'");

    let report = run_analysis(root, "a.js", None)?;

    assert_eq!(
        report.last_change,
        LastChange::Unavailable {
            reason: HistoryError::NotARepository
        }
    );
    let text = render(&report, OutputFormat::Plain, Locale::En)?;
    assert!(text.contains("Last changed by: Not a Git repository"));
    Ok(())
}

#[test]
fn test_symbol_not_found_scenario() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "util.js", "function helper() {}\n");
    write(root, "main.js", "console.log('nothing here');\n");

    let report = run_analysis(root, "util.js", Some("helper"))?;

    assert!(report.impacts.is_empty());
    assert_eq!(report.symbol_file_count, Some(0));
    assert!(report.symbol_not_found());
    assert_eq!(report.risk, RiskTier::Low);

    let text = render(&report, OutputFormat::Markdown, Locale::En)?;
    assert!(text.contains("**Warning:** Function `helper` was not found"));
    assert!(text.contains("Risk Level: LOW"));
    Ok(())
}

#[test]
fn test_high_risk_and_indirect_attribution() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "core.go", "package core\n\ntype Engine struct {}\n\nfunc (e *Engine) Start() {}\n");
    for name in ["api.go", "cli.go", "jobs.go"] {
        write(root, name, "// uses core.go and worker.go\n");
    }
    write(root, "worker.go", "engine.Start()\n");

    let report = run_analysis(root, "core.go", Some("Start"))?;

    assert_eq!(report.impacted_count(), 4);
    assert_eq!(report.risk, RiskTier::High);
    let worker = report.indirect().next().unwrap();
    assert_eq!(worker.file_name(), "worker.go");
    assert_eq!(worker.via.as_deref().and_then(|p| p.file_name()).unwrap(), "api.go");
    assert!(worker.is_high_confidence);
    Ok(())
}

#[test]
fn test_same_line_counts_once() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "mailer.php", "<?php\nclass Mailer {\n  public function send() {}\n}\n");
    write(root, "job.php", "<?php\nrequire 'mailer.php'; $mailer->send();\n");

    let report = run_analysis(root, "mailer.php", Some("send"))?;

    let job = &report.impacts[0];
    assert_eq!(job.matches.len(), 1);
    assert_eq!(job.matches[0].line_number, 2);
    assert_eq!(job.matches[0].match_type, MatchType::FilenameReference);
    assert!(job.is_high_confidence);
    Ok(())
}

#[test]
fn test_target_is_never_impacted() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "a.js", "// a.js\nrun();\n");
    write(root, "lib/a.js", "require('../a.js');\n");

    let report = run_analysis(root, "a.js", Some("run"))?;

    let target = root.canonicalize()?.join("a.js");
    assert!(report.get(&target).is_none());
    assert_eq!(report.impacted_count(), 1);
    assert_eq!(report.impacts[0].path, root.canonicalize()?.join("lib/a.js"));
    Ok(())
}

#[test]
fn test_repeated_runs_are_identical() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "svc.ts", "export const Service = {\n  load() {}\n};\n");
    for i in 0..20 {
        let body = if i % 2 == 0 {
            "import { Service } from './svc.ts';\nService.load();\n"
        } else {
            "load();\n"
        };
        write(root, &format!("mod_{:02}.ts", i), body);
    }

    let first = run_analysis(root, "svc.ts", Some("load"))?;
    let second = run_analysis(root, "svc.ts", Some("load"))?;

    let summary = |r: &ripple::ImpactReport| -> Vec<(String, Vec<usize>, bool)> {
        r.impacts
            .iter()
            .map(|i| (i.file_name(), i.line_numbers(), i.is_high_confidence))
            .collect()
    };
    assert_eq!(summary(&first), summary(&second));
    assert_eq!(first.risk, second.risk);
    assert_eq!(first.symbol_file_count, Some(10));
    Ok(())
}

#[test]
fn test_invalid_requests() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.js", "");

    assert!(matches!(
        run_analysis(root, "missing.js", None),
        Err(AnalysisError::TargetNotFound(_))
    ));
    assert!(matches!(run_analysis(root, "a.js", Some("  ")), Err(AnalysisError::EmptySymbol)));

    let request = ScanRequest::new(root.join("a.js"), None, root.join("nowhere"));
    let result = analyze(&request, &RippleConfig::default(), &CancelToken::new(), None);
    assert!(matches!(result, Err(AnalysisError::RootNotFound(_))));
}

#[test]
fn test_cancelled_run_has_no_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.js", "");
    write(root, "b.js", "import './a.js'");

    let cancel = CancelToken::new();
    cancel.cancel();
    let request = ScanRequest::new(root.join("a.js"), None, root);

    let result = analyze(&request, &RippleConfig::default(), &cancel, None);
    assert!(matches!(result, Err(AnalysisError::Cancelled)));
}

#[test]
fn test_last_commit_from_fixture_repository() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "a.js", "export default 1;\n");
    write(root, "b.js", "import a from './a.js';\n");

    let repo = git2::Repository::init(root)?;
    let mut index = repo.index()?;
    index.add_path(Path::new("a.js"))?;
    index.add_path(Path::new("b.js"))?;
    index.write()?;
    let tree = repo.find_tree(index.write_tree()?)?;
    let signature = git2::Signature::now("Fixture Author", "fixture@example.com")?;
    repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])?;

    let report = run_analysis(root, "a.js", None)?;

    match &report.last_change {
        LastChange::Commit(commit) => {
            assert_eq!(commit.author, "Fixture Author");
            assert!(commit.timestamp.is_some());
        }
        // Environments without a git binary
        LastChange::Unavailable {
            reason: HistoryError::ToolNotInstalled,
        } => {}
        other => panic!("unexpected history result: {:?}", other),
    }
    assert_eq!(report.impacted_count(), 1);
    Ok(())
}
