//! Ordered collections through the full dialog cycle: containment moves,
//! reference-list insertion, and per-collection surplus handling.

use pretty_assertions::assert_eq;

use concord::{DialogKind, DialogViewModel, Iid, OrderedMutation, ThingTransaction};
use concord_harness::{seed_engineering_model, seed_site_directory, SeededSite};

fn open_update(site: &mut SeededSite, iid: Iid, txn: &mut ThingTransaction) -> DialogViewModel {
    let clone = site.session.get(iid).unwrap().clone();
    let container = clone.container().and_then(|c| site.session.get(c)).cloned();
    let mut vm =
        DialogViewModel::new(clone, DialogKind::Update, true, container.as_ref(), Vec::new())
            .unwrap();
    vm.initialize(&site.session, txn).unwrap();
    vm.load(&mut site.session, txn).unwrap();
    vm
}

#[test]
fn factor_move_reaches_the_session_as_one_move() {
    let mut site = seed_site_directory().unwrap();
    let mut txn = ThingTransaction::new();
    let quantity_kind = site.quantity_kind;
    let mut vm = open_update(&mut site, quantity_kind, &mut txn);
    let [a, b, c] = [site.factors[0], site.factors[1], site.factors[2]];

    vm.select_child("quantity_kind_factor", Some(b)).unwrap();
    assert!(vm.execute_move_child_down("quantity_kind_factor").unwrap());

    let report = vm.commit(&site.session, &mut txn).unwrap();
    assert_eq!(
        report.ordered_mutations["quantity_kind_factor"],
        vec![OrderedMutation::Move { iid: c, from: 2, to: 1 }]
    );

    assert!(vm.ok(&mut site.session, &mut txn).unwrap());
    vm.dispose(&mut site.session);
    assert_eq!(
        site.session
            .get(site.quantity_kind)
            .unwrap()
            .containment("quantity_kind_factor")
            .unwrap(),
        &[a, c, b]
    );
}

#[test]
fn file_type_list_inserts_and_removes_surplus() {
    let mut site = seed_site_directory().unwrap();
    let model = seed_engineering_model(&mut site).unwrap();
    let mut txn = ThingTransaction::new();
    let mut vm = open_update(&mut site, model.file_revision, &mut txn);
    let [txt, bin, png] = [site.file_types[0], site.file_types[1], site.file_types[2]];

    assert_eq!(vm.state().ref_list("file_type").unwrap().items(), &[txt, bin]);
    // all loaded file types are offered, label-sorted
    assert_eq!(
        vm.state().possible_ref_list_items("file_type").unwrap().items(),
        &[bin, png, txt]
    );

    // user drops "tabular data" and prepends "image"
    vm.state_mut().ref_list_mut("file_type").unwrap().replace_all(vec![png, bin]);

    let report = vm.commit(&site.session, &mut txn).unwrap();
    assert_eq!(
        report.ordered_mutations["file_type"],
        vec![
            OrderedMutation::Insert { iid: png, at: 0 },
            OrderedMutation::Move { iid: bin, from: 2, to: 1 },
            OrderedMutation::Remove { iid: txt, at: 2 },
        ]
    );

    assert!(vm.ok(&mut site.session, &mut txn).unwrap());
    vm.dispose(&mut site.session);
    assert_eq!(
        site.session.get(model.file_revision).unwrap().ref_list("file_type").unwrap(),
        &[png, bin]
    );
}

#[test]
fn base_quantity_kind_list_never_drops_surplus() {
    let mut site = seed_site_directory().unwrap();
    let mut txn = ThingTransaction::new();
    let base_library = site.base_library;
    let mut vm = open_update(&mut site, base_library, &mut txn);
    let [mass, length, time] =
        [site.base_quantity_kinds[0], site.base_quantity_kinds[1], site.base_quantity_kinds[2]];

    // user reorders to [length, mass]; "time" is left off the dialog list
    vm.state_mut()
        .ref_list_mut("base_quantity_kind")
        .unwrap()
        .replace_all(vec![length, mass]);

    vm.commit(&site.session, &mut txn).unwrap();
    assert_eq!(
        txn.working_copy(site.base_library).unwrap().ref_list("base_quantity_kind").unwrap(),
        &[length, mass, time],
        "this collection moves and inserts but never removes"
    );
}

#[test]
fn unordered_category_list_commits_as_full_replace() {
    let mut site = seed_site_directory().unwrap();
    let mut txn = ThingTransaction::new();
    let glossary = site.glossary;
    let mut vm = open_update(&mut site, glossary, &mut txn);

    vm.state_mut()
        .ref_list_mut("category")
        .unwrap()
        .replace_all(vec![site.categories[1], site.categories[0]]);

    let report = vm.commit(&site.session, &mut txn).unwrap();
    assert_eq!(report.total_mutations(), 0, "unordered lists do not reconcile");
    assert_eq!(
        txn.working_copy(site.glossary).unwrap().ref_list("category").unwrap(),
        &[site.categories[1], site.categories[0]]
    );
}
