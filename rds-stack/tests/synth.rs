use rds_stack::config::SynthConfig;
use rds_stack::diff::ChangeKind;
use rds_stack::synth::{synthesize, SynthOutcome};
use rds_stack::template::{Template, TemplateFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/context.yaml");

fn config(dir: &Path, format: TemplateFormat) -> SynthConfig {
    SynthConfig {
        stack_name: "RDSStack".to_string(),
        context_file: PathBuf::from(FIXTURE),
        output_dir: dir.join("cdk.out"),
        format,
        check_only: false,
    }
}

#[test]
fn test_first_synth_writes_template() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), TemplateFormat::Json);

    let changes = match synthesize(&config).unwrap() {
        SynthOutcome::Written { changes } => changes,
        other => panic!("expected a written template, got {:?}", other),
    };
    assert!(changes.iter().all(|c| c.kind == ChangeKind::Added));
    // 7 resources + 4 outputs
    assert_eq!(changes.len(), 11);

    let text = fs::read_to_string(config.template_path()).unwrap();
    let template = Template::parse(&text, TemplateFormat::Json).unwrap();
    assert_eq!(template.outputs.len(), 4);
}

#[test]
fn test_second_synth_is_unchanged() {
    let dir = TempDir::new().unwrap();
    for format in [TemplateFormat::Json, TemplateFormat::Yaml] {
        let config = config(dir.path(), format);
        synthesize(&config).unwrap();
        let before = fs::read_to_string(config.template_path()).unwrap();

        assert_eq!(synthesize(&config).unwrap(), SynthOutcome::Unchanged);
        assert_eq!(fs::read_to_string(config.template_path()).unwrap(), before);
    }
}

#[test]
fn test_check_only_reports_drift_without_writing() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), TemplateFormat::Json);
    synthesize(&config).unwrap();

    // Simulate a hand edit of the deployed template
    let path = config.template_path();
    let edited = fs::read_to_string(&path)
        .unwrap()
        .replace("\"MultiAZ\": false", "\"MultiAZ\": true");
    fs::write(&path, &edited).unwrap();

    let check = SynthConfig {
        check_only: true,
        ..config.clone()
    };
    let SynthOutcome::Drifted { changes } = synthesize(&check).unwrap() else {
        panic!("expected drift");
    };
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Modified);
    assert!(changes[0].logical_id.starts_with("MySQLDatabase"));
    assert_eq!(fs::read_to_string(&path).unwrap(), edited);

    // A normal run repairs it
    assert!(matches!(
        synthesize(&config).unwrap(),
        SynthOutcome::Written { .. }
    ));
    assert_eq!(synthesize(&config).unwrap(), SynthOutcome::Unchanged);
}

#[test]
fn test_missing_partition_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let context_path = dir.path().join("context.yaml");
    fs::write(
        &context_path,
        "network:\n  vpc_id: vpc-1\n  subnet_groups:\n    - name: Private\n      kind: private\n      subnets:\n        - subnet_id: subnet-1\n          availability_zone: us-east-1a\n",
    )
    .unwrap();

    let config = SynthConfig {
        context_file: context_path,
        ..config(dir.path(), TemplateFormat::Json)
    };
    let err = synthesize(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("Database"));
    assert!(!config.template_path().exists());
}

#[test]
fn test_missing_context_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = SynthConfig {
        context_file: dir.path().join("nope.yaml"),
        ..config(dir.path(), TemplateFormat::Json)
    };
    assert!(synthesize(&config).is_err());
}

#[test]
fn test_reformatted_template_is_not_drift() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), TemplateFormat::Json);
    synthesize(&config).unwrap();

    // Same template value, compact formatting
    let path = config.template_path();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let compact = serde_json::to_string(&value).unwrap();
    fs::write(&path, &compact).unwrap();

    let check = SynthConfig {
        check_only: true,
        ..config.clone()
    };
    assert_eq!(synthesize(&check).unwrap(), SynthOutcome::Unchanged);
    assert_eq!(fs::read_to_string(&path).unwrap(), compact);

    // A normal run restores the canonical formatting without reporting changes
    assert_eq!(synthesize(&config).unwrap(), SynthOutcome::Unchanged);
    assert_ne!(fs::read_to_string(&path).unwrap(), compact);
    assert_eq!(synthesize(&config).unwrap(), SynthOutcome::Unchanged);
}
