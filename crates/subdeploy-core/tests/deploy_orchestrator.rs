//! Single-network codegen, build and deploy behavior.

mod support;

use subdeploy_core::config::{CommandFailurePolicy, DeployConfig};
use subdeploy_core::credentials::{Credentials, Secret};
use subdeploy_core::deploy::Orchestrator;
use subdeploy_core::error::{AuthError, ConfigError, DeployError};
use subdeploy_core::registry::{NetworkEntry, NetworkRegistry};
use subdeploy_core::target::{DeploymentTarget, StudioVersion};
use subdeploy_core::types::NetworkId;

use support::{HOSTED_KEY, RecordingRunner, STUDIO_KEY, orchestrator, unlock_registry};

// =========================================================================
// Target resolution
// =========================================================================

#[test]
fn resolves_hosted_target_for_mainnet() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());
    let target = orch.resolve_target(&"mainnet".into()).unwrap();
    assert_eq!(
        target,
        DeploymentTarget::Hosted {
            subgraph_name: "unlock-protocol/unlock".to_string()
        }
    );
}

#[test]
fn resolves_studio_target_for_polygon() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());
    let target = orch.resolve_target(&"polygon".into()).unwrap();
    assert_eq!(
        target,
        DeploymentTarget::Studio {
            subgraph_name: "unlock-protocol-polygon".to_string(),
            current_version: StudioVersion::new(0, 3, 1),
        }
    );
}

// =========================================================================
// Hosted deploys
// =========================================================================

#[test]
fn hosted_deploy_uses_hosted_product_without_label() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_deploy(&"mainnet".into(), None).unwrap();

    let commands = orch.runner().commands();
    assert_eq!(commands.len(), 1);
    let deploy = &commands[0];
    assert!(deploy.contains("deploy --product hosted-service"));
    assert!(deploy.contains("--node https://api.thegraph.com/deploy/"));
    assert!(deploy.contains("--ipfs https://api.thegraph.com/ipfs/"));
    assert!(deploy.ends_with("unlock-protocol/unlock"));
    assert!(!deploy.contains("--version-label"));
    assert_eq!(report.version_label, None);
}

#[test]
fn hosted_deploy_appends_user_label() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_deploy(&"mainnet".into(), Some("v1.4.0")).unwrap();

    let commands = orch.runner().commands();
    assert!(commands[0].ends_with("unlock-protocol/unlock --version-label=v1.4.0"));
    assert_eq!(report.version_label.as_deref(), Some("v1.4.0"));
}

#[test]
fn hosted_deploy_redacts_access_token() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_deploy(&"mainnet".into(), None).unwrap();

    let logged = &orch.runner().commands()[0];
    assert!(logged.contains("--access-token ***"));
    assert!(!logged.contains(HOSTED_KEY));
    assert!(!report.step.commands[0].command.contains(HOSTED_KEY));
    assert!(orch.runner().exposed()[0].contains(HOSTED_KEY));
}

#[test]
fn hosted_deploy_without_key_fails_before_running() {
    let orch = Orchestrator::new(
        unlock_registry(),
        DeployConfig::default(),
        Credentials::new(None, Some(Secret::new(STUDIO_KEY))),
        RecordingRunner::new(),
    );

    let err = orch.run_deploy(&"mainnet".into(), None).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Auth(AuthError::MissingHostedCredential { .. })
    ));
    assert!(orch.runner().commands().is_empty());
}

// =========================================================================
// Studio deploys
// =========================================================================

#[test]
fn studio_deploy_authenticates_then_deploys_next_patch() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_deploy(&"polygon".into(), None).unwrap();

    let commands = orch.runner().commands();
    assert_eq!(
        commands,
        vec![
            "yarn graph auth --studio ***".to_string(),
            "yarn graph deploy --product subgraph-studio unlock-protocol-polygon --version-label=0.3.2"
                .to_string(),
        ]
    );
    assert!(orch.runner().exposed()[0].ends_with(STUDIO_KEY));
    assert_eq!(report.version_label.as_deref(), Some("0.3.2"));
    assert!(report.step.warnings.is_empty());
}

#[test]
fn studio_deploy_ignores_user_label_with_warning() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_deploy(&"polygon".into(), Some("custom")).unwrap();

    let commands = orch.runner().commands();
    assert!(commands[1].contains("--version-label=0.3.2"));
    assert!(!commands[1].contains("custom"));
    assert_eq!(report.step.warnings.len(), 1);
    assert!(report.step.warnings[0].contains("custom"));
}

#[test]
fn studio_deploy_without_key_fails_before_auth() {
    let orch = Orchestrator::new(
        unlock_registry(),
        DeployConfig::default(),
        Credentials::new(Some(Secret::new(HOSTED_KEY)), None),
        RecordingRunner::new(),
    );

    let err = orch.run_deploy(&"polygon".into(), None).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Auth(AuthError::MissingStudioCredential { .. })
    ));
    assert!(orch.runner().commands().is_empty());
}

// =========================================================================
// Configuration errors
// =========================================================================

#[test]
fn unknown_network_fails_without_commands() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let err = orch.run_deploy(&"goerli".into(), None).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Config(ConfigError::MissingNetwork(ref id)) if id == "goerli"
    ));
    assert!(orch.runner().commands().is_empty());
}

#[test]
fn unrecognized_endpoint_fails_without_commands() {
    let registry = NetworkRegistry::from_entries([(
        "base",
        NetworkEntry::with_endpoint("https://gateway.thegraph.com/api/subgraphs/id/Qm123"),
    )]);
    let orch = orchestrator(registry, RecordingRunner::new());

    let err = orch.run_deploy(&"base".into(), None).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Config(ConfigError::UnrecognizedEndpoint { .. })
    ));
    assert!(orch.runner().commands().is_empty());
}

#[test]
fn dotted_hosted_slug_is_not_resolved_to_another_subgraph() {
    let registry = NetworkRegistry::from_entries([(
        "mainnet",
        NetworkEntry::with_endpoint(
            "https://api.thegraph.com/subgraphs/name/unlock-protocol/../unlock",
        ),
    )]);
    let orch = orchestrator(registry, RecordingRunner::new());

    let err = orch.run_deploy(&"mainnet".into(), None).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Config(ConfigError::UnrecognizedEndpoint { .. })
    ));
    assert!(orch.runner().commands().is_empty());
}

#[test]
fn studio_version_at_upper_bound_fails_without_commands() {
    let registry = NetworkRegistry::from_entries([(
        "polygon",
        NetworkEntry::with_endpoint(
            "https://api.studio.thegraph.com/query/44190/unlock-protocol-polygon/0.0.18446744073709551615",
        ),
    )]);
    let orch = orchestrator(registry, RecordingRunner::new());

    let err = orch.run_deploy(&"polygon".into(), None).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Config(ConfigError::UnrecognizedEndpoint { .. })
    ));
    assert!(orch.runner().commands().is_empty());
}

#[test]
fn build_for_unknown_network_is_missing_network() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let err = orch.run_build(&"goerli".into()).unwrap_err();

    assert!(matches!(
        err,
        DeployError::Config(ConfigError::MissingNetwork(_))
    ));
    assert!(orch.runner().commands().is_empty());
}

// =========================================================================
// Codegen and build
// =========================================================================

#[test]
fn codegen_runs_configured_command() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_codegen().unwrap();

    assert_eq!(orch.runner().commands(), vec!["yarn codegen".to_string()]);
    assert!(report.succeeded());
}

#[test]
fn build_prepares_then_builds_network_name() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    let report = orch.run_build(&"polygon".into()).unwrap();

    assert_eq!(report.build_target, "matic");
    assert_eq!(
        orch.runner().commands(),
        vec!["yarn prepare".to_string(), "yarn build matic".to_string()]
    );
}

#[test]
fn build_falls_back_to_network_id() {
    let registry = NetworkRegistry::from_entries([(
        "optimism",
        NetworkEntry::with_endpoint("https://api.thegraph.com/subgraphs/name/unlock-protocol/optimism"),
    )]);
    let orch = orchestrator(registry, RecordingRunner::new());

    let report = orch.run_build(&"optimism".into()).unwrap();

    assert_eq!(report.build_target, "optimism");
    assert_eq!(orch.runner().commands()[1], "yarn build optimism");
}

#[test]
fn run_network_orders_codegen_build_deploy() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::new());

    orch.run_network(&NetworkId::from("mainnet"), None).unwrap();

    let commands = orch.runner().commands();
    assert_eq!(commands[0], "yarn codegen");
    assert_eq!(commands[1], "yarn prepare");
    assert_eq!(commands[2], "yarn build mainnet");
    assert!(commands[3].starts_with("yarn graph deploy --product hosted-service"));
}

// =========================================================================
// Command failure policy
// =========================================================================

#[test]
fn failed_command_aborts_by_default() {
    let orch = orchestrator(unlock_registry(), RecordingRunner::failing_on("yarn prepare"));

    let err = orch.run_network(&"mainnet".into(), None).unwrap_err();

    assert!(matches!(err, DeployError::Command { step: "prepare", .. }));
    assert_eq!(
        orch.runner().commands(),
        vec!["yarn codegen".to_string(), "yarn prepare".to_string()]
    );
}

#[test]
fn continue_policy_logs_and_proceeds() {
    let mut config = DeployConfig::default();
    config.execution.on_command_failure = CommandFailurePolicy::Continue;
    let orch = Orchestrator::new(
        unlock_registry(),
        config,
        support::credentials(),
        RecordingRunner::failing_on("graph auth"),
    );

    let report = orch.run_deploy(&"polygon".into(), None).unwrap();

    assert_eq!(orch.runner().commands().len(), 2);
    assert!(!report.step.succeeded());
    assert!(!report.step.commands[0].succeeded);
    assert!(report.step.commands[1].succeeded);
    assert!(report.step.warnings[0].contains("auth command failed"));
}

#[test]
fn custom_command_templates_are_used() {
    let mut config = DeployConfig::default();
    config.commands.graph = "npx graph".to_string();
    config.commands.build = "npx graph build --network {network}".to_string();
    let orch = Orchestrator::new(
        unlock_registry(),
        config,
        support::credentials(),
        RecordingRunner::new(),
    );

    orch.run_build(&"polygon".into()).unwrap();
    orch.run_deploy(&"polygon".into(), None).unwrap();

    let commands = orch.runner().commands();
    assert_eq!(commands[1], "npx graph build --network matic");
    assert_eq!(commands[2], "npx graph auth --studio ***");
}

#[test]
fn blank_template_is_invalid_command() {
    let mut config = DeployConfig::default();
    config.commands.codegen = String::new();
    let orch = Orchestrator::new(
        unlock_registry(),
        config,
        support::credentials(),
        RecordingRunner::new(),
    );

    let err = orch.run_codegen().unwrap_err();

    assert!(matches!(err, DeployError::InvalidCommand { name: "codegen", .. }));
    assert!(orch.runner().commands().is_empty());
}
