//! Fabricated session catalogs.
//!
//! Seeds mirror the shape of a small but realistic installation: a site
//! directory with a chained pair of reference data libraries, and an
//! engineering model with one iteration of element and file content. Tests
//! address everything through the returned iid bundles.

use anyhow::Result;

use concord_model::{ClassKind, Iid, ScalarValue, Thing};
use concord_session::Session;

/// Iids of the seeded site-directory graph.
pub struct SeededSite {
    pub session: Session,
    pub site_directory: Iid,
    /// "Generic RDL" — bottom of the required-library chain.
    pub base_library: Iid,
    /// "Space RDL" — requires the base library.
    pub extension_library: Iid,
    pub scale: Iid,
    pub categories: Vec<Iid>,
    pub file_types: Vec<Iid>,
    pub glossary: Iid,
    pub terms: Vec<Iid>,
    /// "force", a derived quantity kind with three ordered factors.
    pub quantity_kind: Iid,
    pub factors: Vec<Iid>,
    /// "mass", "length", "time" — the base quantity kinds.
    pub base_quantity_kinds: Vec<Iid>,
    pub person: Iid,
    pub domain: Iid,
}

/// Iids of the seeded engineering-model graph.
pub struct SeededModel {
    pub model: Iid,
    pub iteration: Iid,
    pub element: Iid,
    pub parameter: Iid,
    pub file_store: Iid,
    pub file: Iid,
    /// "rev 1", carrying the first two seeded file types in order.
    pub file_revision: Iid,
}

fn named(class: ClassKind, name: &str, short_name: &str) -> Result<Thing> {
    let mut thing = Thing::new(class);
    thing.set_text("name", name)?;
    thing.set_text("short_name", short_name)?;
    Ok(thing)
}

fn contain(parent: &mut Thing, collection: &str, child: &mut Thing) -> Result<()> {
    child.set_container(Some(parent.iid()));
    parent.containment_mut(collection)?.push(child.iid());
    Ok(())
}

/// Build a session holding the reference-data side of the catalog.
pub fn seed_site_directory() -> Result<SeededSite> {
    let mut session = Session::new();
    let mut site = named(ClassKind::SiteDirectory, "site directory", "SD")?;

    let mut person = Thing::new(ClassKind::Person);
    person.set_text("given_name", "Jane")?;
    person.set_text("surname", "Doe")?;
    person.set_boolean("is_active", true)?;
    contain(&mut site, "person", &mut person)?;

    let mut domain = named(ClassKind::DomainOfExpertise, "Thermal", "THE")?;
    contain(&mut site, "domain", &mut domain)?;

    let mut base = named(ClassKind::SiteReferenceDataLibrary, "Generic RDL", "GEN")?;
    let mut extension = named(ClassKind::SiteReferenceDataLibrary, "Space RDL", "SPC")?;
    extension.set_reference("required_library", Some(base.iid()))?;
    contain(&mut site, "site_reference_data_library", &mut base)?;
    contain(&mut site, "site_reference_data_library", &mut extension)?;

    let mut scale = named(ClassKind::MeasurementScale, "kelvin", "K")?;
    contain(&mut base, "scale", &mut scale)?;

    let mut categories = Vec::new();
    for (name, short) in [("equipment", "EQT"), ("subsystem", "SYS")] {
        let mut category = named(ClassKind::Category, name, short)?;
        contain(&mut base, "defined_category", &mut category)?;
        categories.push(category.iid());
        session.insert(category);
    }

    let mut file_types = Vec::new();
    for (name, extension_text) in [("tabular data", "txt"), ("binary", "bin"), ("image", "png")] {
        let mut file_type = named(ClassKind::FileType, name, name)?;
        file_type.set_text("extension", extension_text)?;
        contain(&mut base, "file_type", &mut file_type)?;
        file_types.push(file_type.iid());
        session.insert(file_type);
    }

    let mut base_quantity_kinds = Vec::new();
    for (name, symbol) in [("mass", "m"), ("length", "l"), ("time", "t")] {
        let mut kind = named(ClassKind::DerivedQuantityKind, name, name)?;
        kind.set_text("symbol", symbol)?;
        kind.set_reference("default_scale", Some(scale.iid()))?;
        contain(&mut base, "parameter_type", &mut kind)?;
        base_quantity_kinds.push(kind.iid());
        session.insert(kind);
    }
    let bqk = base_quantity_kinds.clone();
    base.ref_list_mut("base_quantity_kind")?.extend(bqk);

    let mut force = named(ClassKind::DerivedQuantityKind, "force", "F")?;
    force.set_text("symbol", "F")?;
    force.set_reference("default_scale", Some(scale.iid()))?;
    let mut factors = Vec::new();
    for (referenced, exponent) in [
        (base_quantity_kinds[0], "1"),
        (base_quantity_kinds[1], "1"),
        (base_quantity_kinds[2], "-2"),
    ] {
        let mut factor = Thing::new(ClassKind::QuantityKindFactor);
        factor.set_text("exponent", exponent)?;
        factor.set_reference("quantity_kind", Some(referenced))?;
        contain(&mut force, "quantity_kind_factor", &mut factor)?;
        factors.push(factor.iid());
        session.insert(factor);
    }
    contain(&mut extension, "parameter_type", &mut force)?;

    let mut glossary = named(ClassKind::Glossary, "spacecraft vocabulary", "SCV")?;
    glossary.ref_list_mut("category")?.push(categories[0]);
    let mut terms = Vec::new();
    for (name, definition) in [
        ("apogee", "the farthest orbit point"),
        ("perigee", "the nearest orbit point"),
        ("umbra", "the full shadow cone"),
    ] {
        let mut term = named(ClassKind::Term, name, name)?;
        term.set_text("definition", definition)?;
        contain(&mut glossary, "term", &mut term)?;
        terms.push(term.iid());
        session.insert(term);
    }
    contain(&mut extension, "glossary", &mut glossary)?;

    let site_directory = site.iid();
    let base_library = base.iid();
    let extension_library = extension.iid();
    let scale_iid = scale.iid();
    let glossary_iid = glossary.iid();
    let quantity_kind = force.iid();
    let person_iid = person.iid();
    let domain_iid = domain.iid();
    for thing in [site, person, domain, base, extension, scale, force, glossary] {
        session.insert(thing);
    }

    Ok(SeededSite {
        session,
        site_directory,
        base_library,
        extension_library,
        scale: scale_iid,
        categories,
        file_types,
        glossary: glossary_iid,
        terms,
        quantity_kind,
        factors,
        base_quantity_kinds,
        person: person_iid,
        domain: domain_iid,
    })
}

/// Add an engineering model with one iteration, an element with a parameter,
/// and a file store with a typed file revision.
pub fn seed_engineering_model(site: &mut SeededSite) -> Result<SeededModel> {
    let mut model = named(ClassKind::EngineeringModel, "orbiter study", "ORB")?;

    let mut iteration = Thing::new(ClassKind::Iteration);
    iteration.set_scalar("iteration_number", ScalarValue::Integer(1))?;
    contain(&mut model, "iteration", &mut iteration)?;

    let mut element = named(ClassKind::ElementDefinition, "battery", "BAT")?;
    element.set_reference("owner", Some(site.domain))?;
    contain(&mut iteration, "element", &mut element)?;

    let mut parameter = Thing::new(ClassKind::Parameter);
    parameter.set_reference("parameter_type", Some(site.quantity_kind))?;
    parameter.set_reference("scale", Some(site.scale))?;
    parameter.set_reference("owner", Some(site.domain))?;
    contain(&mut element, "parameter", &mut parameter)?;

    let mut file_store = Thing::new(ClassKind::DomainFileStore);
    file_store.set_text("name", "thermal store")?;
    file_store.set_reference("owner", Some(site.domain))?;
    contain(&mut iteration, "domain_file_store", &mut file_store)?;

    let mut file = Thing::new(ClassKind::File);
    file.set_reference("owner", Some(site.domain))?;
    contain(&mut file_store, "file", &mut file)?;

    let mut revision = Thing::new(ClassKind::FileRevision);
    revision.set_text("name", "rev 1")?;
    revision.set_text("content_hash", "c0ffee")?;
    revision.set_reference("creator", Some(site.person))?;
    revision
        .ref_list_mut("file_type")?
        .extend([site.file_types[0], site.file_types[1]]);
    contain(&mut file, "file_revision", &mut revision)?;

    let seeded = SeededModel {
        model: model.iid(),
        iteration: iteration.iid(),
        element: element.iid(),
        parameter: parameter.iid(),
        file_store: file_store.iid(),
        file: file.iid(),
        file_revision: revision.iid(),
    };
    site.session.insert(model);
    site.session.insert(iteration);
    site.session.insert(element);
    site.session.insert(parameter);
    site.session.insert(file_store);
    site.session.insert(file);
    site.session.insert(revision);
    Ok(seeded)
}
