mod common;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chainkit_core::domain::{
    AccountKind, AccountState, AdapterEvent, AuthConnector, AuthConnectorCapabilities, Connector,
    ConnectorKind, NamespaceAccount,
};
use chainkit_core::{
    AccountPatch, CaipAddress, ChainCoordinator, IngestOutcome, Namespace, NetworkPatch,
    PortError, RecordProp, RecordPropValue, StateKey, StateValue,
};

use common::{
    descriptor, eip155, mainnet, polygon, solana_mainnet, two_chain_coordinator,
};

fn account_event(address: &str, chain_ref: &str) -> AdapterEvent {
    AdapterEvent::AccountChanged {
        address: address.to_owned(),
        chain_ref: chain_ref.to_owned(),
        accounts: vec![NamespaceAccount {
            address: address.to_owned(),
            kind: AccountKind::Eoa,
        }],
        connector_id: Some("walletConnect".to_owned()),
    }
}

#[test]
fn initialize_with_no_adapters_is_a_wiring_error() {
    let coordinator = ChainCoordinator::new(true);
    let err = coordinator.initialize(vec![]).expect_err("must fail");
    assert!(matches!(err, PortError::Wiring(_)));
}

#[test]
fn first_registered_namespace_becomes_active_with_its_default_network() {
    let coordinator = two_chain_coordinator();
    assert_eq!(
        coordinator.active_namespace().expect("active namespace"),
        Some(Namespace::eip155())
    );
    assert_eq!(
        coordinator.active_network().expect("active network"),
        Some(mainnet())
    );
    let public = coordinator.public_state().expect("public state");
    assert_eq!(public.active_namespace, Some(Namespace::eip155()));
    assert_eq!(public.selected_network, Some(eip155("1")));
}

#[test]
fn set_active_namespace_ignores_unregistered_and_already_active() {
    let coordinator = two_chain_coordinator();
    coordinator
        .set_active_namespace(&Namespace::new("cosmos"))
        .expect("unregistered is a no-op");
    assert_eq!(
        coordinator.active_namespace().expect("active"),
        Some(Namespace::eip155())
    );

    coordinator
        .set_active_namespace(&Namespace::solana())
        .expect("switch");
    assert_eq!(
        coordinator.active_namespace().expect("active"),
        Some(Namespace::solana())
    );
}

#[test]
fn set_active_network_switches_namespace_transitively() {
    let coordinator = two_chain_coordinator();
    coordinator
        .set_active_network(solana_mainnet())
        .expect("activate solana network");
    assert_eq!(
        coordinator.active_namespace().expect("active"),
        Some(Namespace::solana())
    );
    assert_eq!(
        coordinator.active_network().expect("network"),
        Some(solana_mainnet())
    );

    // Switching back restores the namespace's own last active network.
    coordinator
        .set_active_namespace(&Namespace::eip155())
        .expect("switch back");
    assert_eq!(
        coordinator.active_network().expect("network"),
        Some(mainnet())
    );
}

#[test]
fn account_patch_is_shallow_and_supports_clearing() {
    let coordinator = two_chain_coordinator();
    let ns = Namespace::eip155();
    coordinator
        .set_chain_account_data(
            &ns,
            AccountPatch {
                is_connected: Some(true),
                balance: Some(Some("1.5".to_owned())),
                profile_name: Some(Some("vitalik.eth".to_owned())),
                ..AccountPatch::default()
            },
        )
        .expect("patch");

    // Untouched fields survive, Some(None) clears.
    coordinator
        .set_chain_account_data(
            &ns,
            AccountPatch {
                profile_name: Some(None),
                ..AccountPatch::default()
            },
        )
        .expect("clear name");

    let account = coordinator.account_state(Some(&ns)).expect("account");
    assert!(account.is_connected);
    assert_eq!(account.balance.as_deref(), Some("1.5"));
    assert_eq!(account.profile_name, None);
}

#[test]
fn patching_an_unregistered_namespace_is_a_wiring_error() {
    let coordinator = two_chain_coordinator();
    let err = coordinator
        .set_chain_account_data(&Namespace::new("cosmos"), AccountPatch::default())
        .expect_err("must fail");
    assert!(matches!(err, PortError::Wiring(_)));
    let err = coordinator
        .set_chain_network_data(&Namespace::new("cosmos"), NetworkPatch::default(), true)
        .expect_err("must fail");
    assert!(matches!(err, PortError::Wiring(_)));
}

#[test]
fn client_getters_report_wiring_errors() {
    let uninitialized = ChainCoordinator::new(true);
    assert!(matches!(
        uninitialized.get_connection_client(None),
        Err(PortError::Wiring(_))
    ));

    let coordinator = two_chain_coordinator();
    assert!(matches!(
        coordinator.get_network_client(Some(&Namespace::new("cosmos"))),
        Err(PortError::Wiring(_))
    ));
    assert!(coordinator.get_connection_client(None).is_ok());
}

#[test]
fn duplicate_account_events_are_collapsed() {
    let coordinator = two_chain_coordinator();
    let ns = Namespace::eip155();
    let outcome = coordinator
        .ingest(&ns, account_event("0xAbc", "1"))
        .expect("first event");
    assert_eq!(outcome, IngestOutcome::Applied);

    let outcome = coordinator
        .ingest(&ns, account_event("0xAbc", "1"))
        .expect("repeat event");
    assert_eq!(outcome, IngestOutcome::Duplicate);

    // Same address on another chain is a real change.
    let outcome = coordinator
        .ingest(&ns, account_event("0xAbc", "137"))
        .expect("chain move");
    assert_eq!(outcome, IngestOutcome::Applied);
}

#[test]
fn disconnect_event_resets_the_namespace_slice() {
    let coordinator = two_chain_coordinator();
    let ns = Namespace::eip155();
    coordinator
        .ingest(&ns, account_event("0xAbc", "1"))
        .expect("connect");
    coordinator
        .set_chain_account_data(
            &ns,
            AccountPatch {
                balance: Some(Some("2.0".to_owned())),
                ..AccountPatch::default()
            },
        )
        .expect("balance");

    coordinator
        .ingest(&ns, AdapterEvent::Disconnected)
        .expect("disconnect");
    let account = coordinator.account_state(Some(&ns)).expect("account");
    assert_eq!(account, AccountState::default());
}

#[test]
fn connectors_are_deduplicated_first_wins_and_auth_is_excluded() {
    let coordinator = two_chain_coordinator();
    let metamask = Connector::new("io.metamask", "MetaMask", ConnectorKind::Announced);
    let duplicate = Connector::new("io.metamask", "MetaMask (duplicate)", ConnectorKind::Injected);
    let auth = Connector::new("embeddedAuth", "Embedded Wallet", ConnectorKind::Auth);
    coordinator
        .set_connectors(vec![metamask.clone(), duplicate, auth])
        .expect("set connectors");

    let connectors = coordinator.connectors().expect("connectors");
    assert_eq!(connectors.len(), 1);
    assert_eq!(connectors[0], metamask);

    coordinator
        .register_auth_connector(AuthConnector {
            connector: Connector::new("embeddedAuth", "Embedded Wallet", ConnectorKind::Auth),
            capabilities: AuthConnectorCapabilities {
                email: true,
                social_providers: vec!["google".to_owned()],
                show_wallets: true,
                wallet_features: true,
            },
        })
        .expect("register auth connector");
    let auth = coordinator.auth_connector().expect("auth connector");
    assert!(auth.is_some_and(|a| a.capabilities.email));
}

#[test]
fn stale_enrichment_results_are_discarded() {
    let coordinator = two_chain_coordinator();
    let ns = Namespace::eip155();
    coordinator
        .ingest(&ns, account_event("0xAbc", "1"))
        .expect("connect");
    let stale_target = CaipAddress::new(eip155("1"), "0xAbc");

    // Account moves on before the lookup for 0xAbc completes.
    coordinator
        .ingest(&ns, account_event("0xDef", "1"))
        .expect("account switch");

    let applied = coordinator
        .apply_enrichment(
            &ns,
            &stale_target,
            AccountPatch {
                profile_name: Some(Some("stale.eth".to_owned())),
                ..AccountPatch::default()
            },
        )
        .expect("guarded apply");
    assert!(!applied);
    let account = coordinator.account_state(Some(&ns)).expect("account");
    assert_eq!(account.profile_name, None);

    let fresh_target = CaipAddress::new(eip155("1"), "0xDef");
    let applied = coordinator
        .apply_enrichment(
            &ns,
            &fresh_target,
            AccountPatch {
                profile_name: Some(Some("fresh.eth".to_owned())),
                ..AccountPatch::default()
            },
        )
        .expect("guarded apply");
    assert!(applied);
    let account = coordinator.account_state(Some(&ns)).expect("account");
    assert_eq!(account.profile_name.as_deref(), Some("fresh.eth"));
}

#[test]
fn reset_account_uses_active_namespace_when_multichain_is_off() {
    let coordinator = ChainCoordinator::new(false);
    coordinator
        .initialize(vec![descriptor(mainnet())])
        .expect("initialize");
    coordinator
        .ingest(&Namespace::eip155(), account_event("0xAbc", "1"))
        .expect("connect");
    coordinator.reset_account(None).expect("reset");
    let account = coordinator
        .account_state(Some(&Namespace::eip155()))
        .expect("account");
    assert_eq!(account, AccountState::default());

    let empty = ChainCoordinator::new(false);
    let err = empty.reset_account(None).expect_err("nothing active");
    assert!(matches!(err, PortError::Wiring(_)));
}

#[test]
fn key_subscription_fires_only_on_value_change() {
    let coordinator = two_chain_coordinator();
    let seen: Arc<Mutex<Vec<StateValue>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _handle = coordinator.subscribe_key(StateKey::ActiveNamespace, move |value| {
        sink.lock().expect("sink lock").push(value.clone());
    });

    // Re-asserting the current namespace publishes nothing.
    coordinator
        .set_active_namespace(&Namespace::eip155())
        .expect("no-op switch");
    coordinator
        .set_active_namespace(&Namespace::solana())
        .expect("switch");
    coordinator
        .set_active_namespace(&Namespace::solana())
        .expect("repeat switch");

    let seen = seen.lock().expect("seen lock");
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0],
        StateValue::ActiveNamespace(Some(Namespace::eip155()))
    );
    assert_eq!(
        seen[1],
        StateValue::ActiveNamespace(Some(Namespace::solana()))
    );
}

#[test]
fn record_prop_subscription_compares_by_value() {
    let coordinator = two_chain_coordinator();
    let fired = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&fired);
    let _handle = coordinator.subscribe_record_prop(RecordProp::AccountState, move |value| {
        assert!(matches!(value, RecordPropValue::AccountState(_)));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let ns = Namespace::eip155();
    coordinator
        .ingest(&ns, account_event("0xAbc", "1"))
        .expect("connect");
    let after_connect = fired.load(Ordering::SeqCst);
    assert!(after_connect >= 1);

    // An identical merge changes nothing and must not fire.
    coordinator
        .set_chain_account_data(&ns, AccountPatch::default())
        .expect("noop patch");
    assert_eq!(fired.load(Ordering::SeqCst), after_connect);
}

#[test]
fn unsubscribed_handles_stop_receiving() {
    let coordinator = two_chain_coordinator();
    let fired = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&fired);
    let handle = coordinator.subscribe_key(StateKey::Connectors, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    coordinator
        .set_connectors(vec![Connector::new("a", "A", ConnectorKind::Injected)])
        .expect("first publish");
    let before = fired.load(Ordering::SeqCst);
    handle.unsubscribe();
    coordinator
        .set_connectors(vec![Connector::new("b", "B", ConnectorKind::Injected)])
        .expect("second publish");
    assert_eq!(fired.load(Ordering::SeqCst), before);
}

#[test]
fn network_patch_republish_updates_top_level_only_for_active_namespace() {
    let coordinator = two_chain_coordinator();
    // Patch the inactive solana slice with republish on: top-level unchanged.
    coordinator
        .set_chain_network_data(
            &Namespace::solana(),
            NetworkPatch {
                active_network: Some(Some(solana_mainnet())),
                ..NetworkPatch::default()
            },
            true,
        )
        .expect("patch inactive");
    assert_eq!(
        coordinator.active_network().expect("network"),
        Some(mainnet())
    );

    coordinator
        .set_chain_network_data(
            &Namespace::eip155(),
            NetworkPatch {
                active_network: Some(Some(polygon())),
                ..NetworkPatch::default()
            },
            true,
        )
        .expect("patch active");
    assert_eq!(
        coordinator.active_network().expect("network"),
        Some(polygon())
    );
}

#[test]
fn dispose_clears_registrations() {
    let coordinator = two_chain_coordinator();
    coordinator.dispose().expect("dispose");
    assert_eq!(coordinator.active_namespace().expect("active"), None);
    assert!(matches!(
        coordinator.get_connection_client(None),
        Err(PortError::Wiring(_))
    ));
    // Re-initialization after dispose is allowed.
    coordinator
        .initialize(vec![descriptor(mainnet())])
        .expect("re-initialize");
}
