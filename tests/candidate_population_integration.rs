//! Candidate-container population per dialog mode, permission filtering,
//! and the construction-time container rule.

use pretty_assertions::assert_eq;

use concord::{
    ClassKind, DialogError, DialogKind, DialogViewModel, Session, Thing, ThingTransaction,
};
use concord_harness::{seed_site_directory, StubPermissions};

#[test]
fn create_mode_filters_candidates_by_write_permission() {
    let base = seed_site_directory().unwrap();
    let mut session = Session::with_permissions(Box::new(
        StubPermissions::new().deny_write(base.base_library),
    ));
    for iid in [base.site_directory, base.base_library, base.extension_library] {
        session.insert(base.session.get(iid).unwrap().clone());
    }
    let mut txn = ThingTransaction::new();

    let mut vm = DialogViewModel::new(
        Thing::new(ClassKind::Glossary),
        DialogKind::Create,
        true,
        None,
        Vec::new(),
    )
    .unwrap();
    vm.initialize(&session, &mut txn).unwrap();
    vm.load(&mut session, &txn).unwrap();

    assert_eq!(vm.state().possible_containers().items(), &[base.extension_library]);
    assert_eq!(vm.state().selected_container(), Some(base.extension_library));
}

#[test]
fn create_mode_without_any_candidate_disables_ok() {
    let mut session = Session::new();
    let mut txn = ThingTransaction::new();

    let mut vm = DialogViewModel::new(
        Thing::new(ClassKind::Glossary),
        DialogKind::Create,
        true,
        None,
        Vec::new(),
    )
    .unwrap();
    vm.initialize(&session, &mut txn).unwrap();
    vm.load(&mut session, &txn).unwrap();

    assert!(vm.state().possible_containers().is_empty());
    assert_eq!(vm.state().selected_container(), None);
    assert!(!vm.ok_can_execute());
    assert!(txn.is_empty(), "nothing to register without a container");
}

#[test]
fn update_mode_offers_the_write_permitted_library_chain() {
    let base = seed_site_directory().unwrap();
    let mut txn = ThingTransaction::new();

    // fully permitted: actual container plus its required chain
    let clone = base.session.get(base.quantity_kind).unwrap().clone();
    let container = base.session.get(base.extension_library).cloned();
    let mut vm =
        DialogViewModel::new(clone.clone(), DialogKind::Update, true, container.as_ref(), Vec::new())
            .unwrap();
    vm.initialize(&base.session, &mut txn).unwrap();
    assert_eq!(
        vm.state().possible_containers().items(),
        &[base.extension_library, base.base_library]
    );

    // chain entries without write permission disappear; the actual container stays
    let mut denied = Session::with_permissions(Box::new(
        StubPermissions::new().deny_write(base.base_library),
    ));
    for iid in [base.site_directory, base.base_library, base.extension_library, base.quantity_kind]
    {
        denied.insert(base.session.get(iid).unwrap().clone());
    }
    let mut txn = ThingTransaction::new();
    let container = denied.get(base.extension_library).cloned();
    let mut vm =
        DialogViewModel::new(clone, DialogKind::Update, true, container.as_ref(), Vec::new())
            .unwrap();
    vm.initialize(&denied, &mut txn).unwrap();
    assert_eq!(vm.state().possible_containers().items(), &[base.extension_library]);
}

#[test]
fn inspect_mode_offers_a_singleton_for_every_seeded_class() {
    let mut site = seed_site_directory().unwrap();
    for iid in [site.glossary, site.quantity_kind, site.scale, site.terms[0], site.factors[0]] {
        let mut txn = ThingTransaction::new();
        let clone = site.session.get(iid).unwrap().clone();
        let expected = clone.container();
        let mut vm =
            DialogViewModel::new(clone, DialogKind::Inspect, true, None, Vec::new()).unwrap();
        vm.initialize(&site.session, &mut txn).unwrap();
        vm.load(&mut site.session, &txn).unwrap();

        assert_eq!(vm.state().possible_containers().len(), 1);
        assert_eq!(vm.state().selected_container(), expected);
        vm.dispose(&mut site.session);
    }
}

#[test]
fn parameter_dialog_rejects_a_site_directory_container() {
    let site = seed_site_directory().unwrap();
    let directory = site.session.get(site.site_directory).unwrap();

    let err = DialogViewModel::new(
        Thing::new(ClassKind::Parameter),
        DialogKind::Create,
        true,
        Some(directory),
        Vec::new(),
    )
    .unwrap_err();

    match err {
        DialogError::InvalidContainerType { class, supplied } => {
            assert_eq!(class, ClassKind::Parameter);
            assert_eq!(supplied, ClassKind::SiteDirectory);
        }
        other => panic!("expected InvalidContainerType, got {other}"),
    }
}
