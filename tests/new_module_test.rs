use anyhow::Result;
use git2::Repository;
use module_creator::area::Area;
use module_creator::config::Config;
use module_creator::content::TemplateContent;
use module_creator::creator::ModuleCreator;
use module_creator::error::CreatorError;
use module_creator::gate::Gate;
use module_creator::gateway::{MockGateway, PushRecord};
use module_creator::module::CreationRequest;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{head_message, new_module_creator};

#[test]
fn test_verify_remote_repo_is_idempotent() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.verify_remote_repo()?;
    creator.verify_remote_repo()?;

    assert_eq!(gateway.calls().exists, 1);
    assert_eq!(creator.gates().remote_valid, Gate::Passed);
    Ok(())
}

#[test]
fn test_remote_path_taken() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new().with_repo("controls/support/foo");
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    let err = creator.verify_remote_repo().unwrap_err();

    assert!(err.is_recoverable());
    assert_eq!(
        err.verification_reasons().unwrap(),
        ["The path controls/support/foo already exists on the remote host, cannot continue"]
    );
    assert_eq!(gateway.calls().clone_disposable, 0);
    assert_eq!(gateway.calls().create_container, 0);
    assert!(gateway.pushes().is_empty());
    assert!(!dir.path().join("foo").exists());
    Ok(())
}

#[test]
fn test_local_errors_are_combined() -> Result<()> {
    let dir = TempDir::new()?;
    Repository::init(dir.path())?;
    fs::create_dir(dir.path().join("foo"))?;
    let mut creator = new_module_creator(dir.path(), "foo", &MockGateway::new())?;

    let err = creator.verify_can_create_local_module().unwrap_err();

    assert_eq!(
        err.verification_reasons().unwrap(),
        [
            "Directory foo already exists, please move elsewhere and try again.",
            "Currently in a git repository, please move elsewhere and try again.",
        ]
    );
    assert_eq!(creator.gates().local_creation, Gate::Unchecked);
    Ok(())
}

#[test]
fn test_create_local_module_commits_template() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.create_local_module()?;

    let module = dir.path().join("foo");
    assert_eq!(fs::read_to_string(module.join("README.md"))?, "# foo\n");
    assert_eq!(head_message(&module)?, "Initial commit.");
    assert!(Repository::open(&module)?.find_branch("master", git2::BranchType::Local).is_ok());
    assert_eq!(creator.gates().local_creation, Gate::Consumed);
    assert_eq!(gateway.calls().clone_durable, 0);
    Ok(())
}

#[test]
fn test_second_create_reverifies_and_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let mut creator = new_module_creator(dir.path(), "foo", &MockGateway::new())?;

    creator.create_local_module()?;
    let err = creator.create_local_module().unwrap_err();

    assert_eq!(
        err.verification_reasons().unwrap(),
        ["Directory foo already exists, please move elsewhere and try again."]
    );
    Ok(())
}

#[test]
fn test_full_creation_pushes_to_new_container() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.verify_remote_repo()?;
    creator.verify_can_create_local_module()?;
    creator.create_local_module()?;
    creator.push_repo_to_remote()?;

    assert!(gateway.repo_exists("controls/support/foo"));
    assert_eq!(gateway.calls().create_container, 1);
    assert_eq!(gateway.calls().push, 0);
    assert_eq!(
        gateway.pushes(),
        vec![PushRecord {
            local_path: dir.path().join("foo"),
            remote_path: Some("controls/support/foo".to_string()),
            remote_name: "origin".to_string(),
            branch: "master".to_string(),
        }]
    );
    assert_eq!(creator.gates().push, Gate::Consumed);
    assert_eq!(creator.gates().remote_valid, Gate::Consumed);
    Ok(())
}

#[test]
fn test_push_without_local_module_lists_every_reason() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new().with_repo("controls/support/foo");
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    let err = creator.push_repo_to_remote().unwrap_err();

    assert_eq!(
        err.verification_reasons().unwrap(),
        [
            "Directory foo does not exist.",
            "The path controls/support/foo already exists on the remote host, cannot continue",
        ]
    );
    assert_eq!(gateway.calls().create_container, 0);
    Ok(())
}

#[test]
fn test_push_of_plain_directory_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir(dir.path().join("foo"))?;
    let mut creator = new_module_creator(dir.path(), "foo", &MockGateway::new())?;

    let err = creator.verify_can_push_repo_to_remote().unwrap_err();

    assert_eq!(
        err.verification_reasons().unwrap(),
        ["Directory foo is not a git repository. Unable to push to remote repository."]
    );
    Ok(())
}

#[test]
fn test_second_push_reverifies_remote() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.create_local_module()?;
    creator.push_repo_to_remote()?;
    let err = creator.push_repo_to_remote().unwrap_err();

    assert_eq!(
        err.verification_reasons().unwrap(),
        ["The path controls/support/foo already exists on the remote host, cannot continue"]
    );
    assert_eq!(gateway.calls().create_container, 1);
    Ok(())
}

#[test]
fn test_remote_claimed_after_verification_fails_at_push() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.verify_remote_repo()?;
    creator.create_local_module()?;
    gateway.set_repo_exists("controls/support/foo", true);

    let err = creator.push_repo_to_remote().unwrap_err();

    assert!(matches!(err, CreatorError::Operation(_)));
    assert!(err.to_string().contains("controls/support/foo"));
    assert!(gateway.pushes().is_empty());
    Ok(())
}

#[test]
fn test_push_failure_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new().with_push_failure("connection reset");
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.create_local_module()?;
    let err = creator.push_repo_to_remote().unwrap_err();

    assert!(!err.is_recoverable());
    assert!(format!("{err:#}").contains("connection reset"));
    Ok(())
}

#[test]
fn test_ioc_module_needs_technical_area() -> Result<()> {
    let dir = TempDir::new()?;
    let request = CreationRequest::new("BL01I", Area::Ioc).in_directory(dir.path());

    let result = ModuleCreator::new_module(
        &request,
        &Config::default(),
        Box::new(MockGateway::new()),
        Box::new(TemplateContent::default_module()),
    );

    match result {
        Err(CreatorError::Argument(message)) => {
            assert_eq!(message, "Missing technical area under beamline")
        }
        _ => panic!("expected an argument error"),
    }
    Ok(())
}

#[test]
fn test_ioc_module_paths() -> Result<()> {
    let dir = TempDir::new()?;
    let request = CreationRequest::new("BL01I/MO/", Area::Ioc).in_directory(dir.path());
    let creator = ModuleCreator::new_module(
        &request,
        &Config::default(),
        Box::new(MockGateway::new()),
        Box::new(TemplateContent::default_module()),
    )?;

    let identity = creator.identity();
    assert_eq!(identity.module_path(), "BL01I/MO");
    assert_eq!(identity.module_name(), "MO");
    assert_eq!(identity.remote_path(), "controls/ioc/BL01I/MO");
    assert_eq!(identity.abs_path(), dir.path().join("BL01I/MO"));
    Ok(())
}

#[test]
fn test_invalid_module_path_is_argument_error() -> Result<()> {
    let dir = TempDir::new()?;
    for path in ["", "../escape", "/abs", "a/.git/b"] {
        let err = new_module_creator(dir.path(), path, &MockGateway::new())
            .err()
            .unwrap();
        assert!(matches!(err, CreatorError::Argument(_)), "path {path:?}");
    }
    Ok(())
}

#[test]
fn test_next_steps_message_uses_template_args() -> Result<()> {
    let dir = TempDir::new()?;
    let creator = new_module_creator(dir.path(), "foo", &MockGateway::new())?;

    assert_eq!(
        creator.next_steps_message(),
        "Module foo has been created.\nReview the generated files before building."
    );
    Ok(())
}

#[test]
fn test_push_without_commit_leaves_host_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let request = CreationRequest::new("foo", Area::Support).in_directory(dir.path());
    let mut creator = ModuleCreator::new_module(
        &request,
        &Config::default(),
        Box::new(gateway.clone()),
        Box::new(TemplateContent::new("done")),
    )?;

    creator.create_local_module()?;
    let err = creator.push_repo_to_remote().unwrap_err();

    assert!(matches!(err, CreatorError::Operation(_)));
    assert!(err.to_string().contains("branch master does not currently exist"));
    assert!(!gateway.repo_exists("controls/support/foo"));
    assert_eq!(gateway.calls().create_container, 0);

    let mut retry = new_module_creator(TempDir::new()?.path(), "foo", &gateway)?;
    retry.verify_remote_repo()?;
    Ok(())
}

#[test]
fn test_push_with_existing_alias_leaves_host_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let gateway = MockGateway::new();
    let mut creator = new_module_creator(dir.path(), "foo", &gateway)?;

    creator.create_local_module()?;
    Repository::open(dir.path().join("foo"))?.remote("origin", "/somewhere/else")?;
    let err = creator.push_repo_to_remote().unwrap_err();

    assert!(matches!(err, CreatorError::Operation(_)));
    assert!(err.to_string().contains("origin"));
    assert!(!gateway.repo_exists("controls/support/foo"));
    assert_eq!(gateway.calls().create_container, 0);
    assert!(gateway.pushes().is_empty());
    Ok(())
}
