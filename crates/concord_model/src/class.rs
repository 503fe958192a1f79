//! Static class registry.
//!
//! One [`ClassDef`] per [`ClassKind`] declares everything the session and
//! dialog layers need to know about a class: its container rule, scalar
//! attributes, references and owned collections. Collection capabilities
//! (`ordered`, `supports_insert`, `supports_surplus_removal`) are declared
//! explicitly here; downstream code never infers them.

use serde::{Deserialize, Serialize};

use crate::value::ScalarKind;

/// Attribute and collection keys are static registry strings.
pub type AttrKey = &'static str;

/// Every persistable class in the model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum ClassKind {
    SiteDirectory,
    Person,
    DomainOfExpertise,
    SiteReferenceDataLibrary,
    Category,
    FileType,
    MeasurementScale,
    Glossary,
    Term,
    DerivedQuantityKind,
    QuantityKindFactor,
    EngineeringModel,
    Iteration,
    ElementDefinition,
    Parameter,
    DomainFileStore,
    File,
    FileRevision,
}

/// Which classes may contain an instance of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRule {
    /// Top-level thing; it has no container.
    Root,
    /// Contained by exactly one thing whose class is in the list.
    AnyOf(&'static [ClassKind]),
}

impl ContainerRule {
    pub fn accepts(&self, kind: ClassKind) -> bool {
        match self {
            Self::Root => false,
            Self::AnyOf(kinds) => kinds.contains(&kind),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

/// A scalar attribute declaration.
#[derive(Debug, Clone, Copy)]
pub struct AttrDef {
    pub key: AttrKey,
    pub kind: ScalarKind,
    pub required: bool,
}

/// A single, non-owning reference to another thing.
#[derive(Debug, Clone, Copy)]
pub struct RefDef {
    pub key: AttrKey,
    pub target: ClassKind,
}

/// A multi-valued, non-owning reference collection.
///
/// Unordered lists commit as a full replace. Ordered lists commit through
/// minimal-move reconciliation, whose insert and surplus-removal steps run
/// only when the corresponding capability is set.
#[derive(Debug, Clone, Copy)]
pub struct RefListDef {
    pub key: AttrKey,
    pub target: ClassKind,
    pub ordered: bool,
    pub supports_insert: bool,
    pub supports_surplus_removal: bool,
}

/// An owning child collection.
#[derive(Debug, Clone, Copy)]
pub struct ContainmentDef {
    pub key: AttrKey,
    pub child: ClassKind,
    pub ordered: bool,
}

/// The full registry entry for one class.
#[derive(Debug, Clone, Copy)]
pub struct ClassDef {
    pub kind: ClassKind,
    pub container: ContainerRule,
    pub scalars: &'static [AttrDef],
    pub references: &'static [RefDef],
    pub ref_lists: &'static [RefListDef],
    pub containments: &'static [ContainmentDef],
    /// Containers of this class form a transitive required-library chain
    /// through their `required_library` reference.
    pub library_chain: bool,
}

impl ClassDef {
    pub fn scalar(&self, key: &str) -> Option<&'static AttrDef> {
        self.scalars.iter().find(|a| a.key == key)
    }

    pub fn reference(&self, key: &str) -> Option<&'static RefDef> {
        self.references.iter().find(|r| r.key == key)
    }

    pub fn ref_list(&self, key: &str) -> Option<&'static RefListDef> {
        self.ref_lists.iter().find(|r| r.key == key)
    }

    pub fn containment(&self, key: &str) -> Option<&'static ContainmentDef> {
        self.containments.iter().find(|c| c.key == key)
    }

    /// The containment collection of this class that accepts children of
    /// `child`, if any.
    pub fn containment_for_child(&self, child: ClassKind) -> Option<&'static ContainmentDef> {
        self.containments.iter().find(|c| c.child == child)
    }
}

const NAMED: &[AttrDef] = &[
    AttrDef { key: "name", kind: ScalarKind::Text, required: true },
    AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
];

const SITE_DIRECTORY: ClassDef = ClassDef {
    kind: ClassKind::SiteDirectory,
    container: ContainerRule::Root,
    scalars: NAMED,
    references: &[],
    ref_lists: &[],
    containments: &[
        ContainmentDef { key: "site_reference_data_library", child: ClassKind::SiteReferenceDataLibrary, ordered: false },
        ContainmentDef { key: "person", child: ClassKind::Person, ordered: false },
        ContainmentDef { key: "domain", child: ClassKind::DomainOfExpertise, ordered: false },
    ],
    library_chain: false,
};

const PERSON: ClassDef = ClassDef {
    kind: ClassKind::Person,
    container: ContainerRule::AnyOf(&[ClassKind::SiteDirectory]),
    scalars: &[
        AttrDef { key: "given_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "surname", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_active", kind: ScalarKind::Boolean, required: false },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[RefDef { key: "default_domain", target: ClassKind::DomainOfExpertise }],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const DOMAIN_OF_EXPERTISE: ClassDef = ClassDef {
    kind: ClassKind::DomainOfExpertise,
    container: ContainerRule::AnyOf(&[ClassKind::SiteDirectory]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const SITE_REFERENCE_DATA_LIBRARY: ClassDef = ClassDef {
    kind: ClassKind::SiteReferenceDataLibrary,
    container: ContainerRule::AnyOf(&[ClassKind::SiteDirectory]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[RefDef { key: "required_library", target: ClassKind::SiteReferenceDataLibrary }],
    ref_lists: &[RefListDef {
        key: "base_quantity_kind",
        target: ClassKind::DerivedQuantityKind,
        ordered: true,
        supports_insert: true,
        supports_surplus_removal: false,
    }],
    containments: &[
        ContainmentDef { key: "parameter_type", child: ClassKind::DerivedQuantityKind, ordered: false },
        ContainmentDef { key: "scale", child: ClassKind::MeasurementScale, ordered: false },
        ContainmentDef { key: "file_type", child: ClassKind::FileType, ordered: false },
        ContainmentDef { key: "glossary", child: ClassKind::Glossary, ordered: false },
        ContainmentDef { key: "defined_category", child: ClassKind::Category, ordered: false },
    ],
    library_chain: true,
};

const CATEGORY: ClassDef = ClassDef {
    kind: ClassKind::Category,
    container: ContainerRule::AnyOf(&[ClassKind::SiteReferenceDataLibrary]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_abstract", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const FILE_TYPE: ClassDef = ClassDef {
    kind: ClassKind::FileType,
    container: ContainerRule::AnyOf(&[ClassKind::SiteReferenceDataLibrary]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "extension", kind: ScalarKind::Text, required: true },
    ],
    references: &[],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const MEASUREMENT_SCALE: ClassDef = ClassDef {
    kind: ClassKind::MeasurementScale,
    container: ContainerRule::AnyOf(&[ClassKind::SiteReferenceDataLibrary]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const GLOSSARY: ClassDef = ClassDef {
    kind: ClassKind::Glossary,
    container: ContainerRule::AnyOf(&[ClassKind::SiteReferenceDataLibrary]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[],
    ref_lists: &[RefListDef {
        key: "category",
        target: ClassKind::Category,
        ordered: false,
        supports_insert: false,
        supports_surplus_removal: false,
    }],
    containments: &[ContainmentDef { key: "term", child: ClassKind::Term, ordered: false }],
    library_chain: false,
};

const TERM: ClassDef = ClassDef {
    kind: ClassKind::Term,
    container: ContainerRule::AnyOf(&[ClassKind::Glossary]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "definition", kind: ScalarKind::Text, required: false },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const DERIVED_QUANTITY_KIND: ClassDef = ClassDef {
    kind: ClassKind::DerivedQuantityKind,
    container: ContainerRule::AnyOf(&[ClassKind::SiteReferenceDataLibrary]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "short_name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "symbol", kind: ScalarKind::Text, required: true },
        AttrDef { key: "quantity_dimension_symbol", kind: ScalarKind::Text, required: false },
        AttrDef { key: "is_deprecated", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[RefDef { key: "default_scale", target: ClassKind::MeasurementScale }],
    ref_lists: &[],
    containments: &[ContainmentDef {
        key: "quantity_kind_factor",
        child: ClassKind::QuantityKindFactor,
        ordered: true,
    }],
    library_chain: false,
};

const QUANTITY_KIND_FACTOR: ClassDef = ClassDef {
    kind: ClassKind::QuantityKindFactor,
    container: ContainerRule::AnyOf(&[ClassKind::DerivedQuantityKind]),
    scalars: &[AttrDef { key: "exponent", kind: ScalarKind::Text, required: true }],
    references: &[RefDef { key: "quantity_kind", target: ClassKind::DerivedQuantityKind }],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const ENGINEERING_MODEL: ClassDef = ClassDef {
    kind: ClassKind::EngineeringModel,
    container: ContainerRule::Root,
    scalars: NAMED,
    references: &[],
    ref_lists: &[],
    containments: &[ContainmentDef { key: "iteration", child: ClassKind::Iteration, ordered: false }],
    library_chain: false,
};

const ITERATION: ClassDef = ClassDef {
    kind: ClassKind::Iteration,
    container: ContainerRule::AnyOf(&[ClassKind::EngineeringModel]),
    scalars: &[AttrDef { key: "iteration_number", kind: ScalarKind::Integer, required: true }],
    references: &[],
    ref_lists: &[],
    containments: &[
        ContainmentDef { key: "element", child: ClassKind::ElementDefinition, ordered: false },
        ContainmentDef { key: "domain_file_store", child: ClassKind::DomainFileStore, ordered: false },
    ],
    library_chain: false,
};

const ELEMENT_DEFINITION: ClassDef = ClassDef {
    kind: ClassKind::ElementDefinition,
    container: ContainerRule::AnyOf(&[ClassKind::Iteration]),
    scalars: NAMED,
    references: &[RefDef { key: "owner", target: ClassKind::DomainOfExpertise }],
    ref_lists: &[],
    containments: &[ContainmentDef { key: "parameter", child: ClassKind::Parameter, ordered: false }],
    library_chain: false,
};

const PARAMETER: ClassDef = ClassDef {
    kind: ClassKind::Parameter,
    container: ContainerRule::AnyOf(&[ClassKind::ElementDefinition]),
    scalars: &[
        AttrDef { key: "expects_override", kind: ScalarKind::Boolean, required: false },
        AttrDef { key: "is_optional_dependent", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[
        RefDef { key: "parameter_type", target: ClassKind::DerivedQuantityKind },
        RefDef { key: "scale", target: ClassKind::MeasurementScale },
        RefDef { key: "owner", target: ClassKind::DomainOfExpertise },
    ],
    ref_lists: &[],
    containments: &[],
    library_chain: false,
};

const DOMAIN_FILE_STORE: ClassDef = ClassDef {
    kind: ClassKind::DomainFileStore,
    container: ContainerRule::AnyOf(&[ClassKind::Iteration]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "is_hidden", kind: ScalarKind::Boolean, required: false },
    ],
    references: &[RefDef { key: "owner", target: ClassKind::DomainOfExpertise }],
    ref_lists: &[],
    containments: &[ContainmentDef { key: "file", child: ClassKind::File, ordered: false }],
    library_chain: false,
};

const FILE: ClassDef = ClassDef {
    kind: ClassKind::File,
    container: ContainerRule::AnyOf(&[ClassKind::DomainFileStore]),
    scalars: &[],
    references: &[
        RefDef { key: "owner", target: ClassKind::DomainOfExpertise },
        RefDef { key: "locked_by", target: ClassKind::Person },
    ],
    ref_lists: &[],
    containments: &[ContainmentDef { key: "file_revision", child: ClassKind::FileRevision, ordered: false }],
    library_chain: false,
};

// The one collection in the model that both inserts missing entries and
// removes trailing orphans on commit.
const FILE_REVISION: ClassDef = ClassDef {
    kind: ClassKind::FileRevision,
    container: ContainerRule::AnyOf(&[ClassKind::File]),
    scalars: &[
        AttrDef { key: "name", kind: ScalarKind::Text, required: true },
        AttrDef { key: "content_hash", kind: ScalarKind::Text, required: true },
        AttrDef { key: "created_on", kind: ScalarKind::Instant, required: false },
    ],
    references: &[RefDef { key: "creator", target: ClassKind::Person }],
    ref_lists: &[RefListDef {
        key: "file_type",
        target: ClassKind::FileType,
        ordered: true,
        supports_insert: true,
        supports_surplus_removal: true,
    }],
    containments: &[],
    library_chain: false,
};

impl ClassKind {
    /// Registry entry for this class.
    pub fn def(self) -> &'static ClassDef {
        match self {
            Self::SiteDirectory => &SITE_DIRECTORY,
            Self::Person => &PERSON,
            Self::DomainOfExpertise => &DOMAIN_OF_EXPERTISE,
            Self::SiteReferenceDataLibrary => &SITE_REFERENCE_DATA_LIBRARY,
            Self::Category => &CATEGORY,
            Self::FileType => &FILE_TYPE,
            Self::MeasurementScale => &MEASUREMENT_SCALE,
            Self::Glossary => &GLOSSARY,
            Self::Term => &TERM,
            Self::DerivedQuantityKind => &DERIVED_QUANTITY_KIND,
            Self::QuantityKindFactor => &QUANTITY_KIND_FACTOR,
            Self::EngineeringModel => &ENGINEERING_MODEL,
            Self::Iteration => &ITERATION,
            Self::ElementDefinition => &ELEMENT_DEFINITION,
            Self::Parameter => &PARAMETER,
            Self::DomainFileStore => &DOMAIN_FILE_STORE,
            Self::File => &FILE,
            Self::FileRevision => &FILE_REVISION,
        }
    }

    pub fn is_root(self) -> bool {
        self.def().container.is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    // ── registry consistency ──────────────────────────────────────

    #[test]
    fn every_class_has_a_def_with_matching_kind() {
        for kind in ClassKind::iter() {
            assert_eq!(kind.def().kind, kind);
        }
    }

    #[test]
    fn every_containment_child_accepts_its_parent() {
        for kind in ClassKind::iter() {
            for containment in kind.def().containments {
                assert!(
                    containment.child.def().container.accepts(kind),
                    "{kind}.{} child {} does not accept {kind} as container",
                    containment.key,
                    containment.child,
                );
            }
        }
    }

    #[test]
    fn every_non_root_class_is_containable_somewhere() {
        for kind in ClassKind::iter() {
            if kind.is_root() {
                continue;
            }
            let reachable = ClassKind::iter()
                .any(|parent| parent.def().containment_for_child(kind).is_some());
            assert!(reachable, "{kind} is not reachable from any containment");
        }
    }

    #[test]
    fn attribute_keys_are_unique_per_class() {
        for kind in ClassKind::iter() {
            let def = kind.def();
            let mut keys: Vec<&str> = def
                .scalars
                .iter()
                .map(|a| a.key)
                .chain(def.references.iter().map(|r| r.key))
                .chain(def.ref_lists.iter().map(|r| r.key))
                .chain(def.containments.iter().map(|c| c.key))
                .collect();
            let total = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), total, "duplicate attribute key on {kind}");
        }
    }

    // ── capability flags ──────────────────────────────────────────

    #[test]
    fn surplus_removal_implies_ordered() {
        for kind in ClassKind::iter() {
            for list in kind.def().ref_lists {
                if list.supports_surplus_removal {
                    assert!(list.ordered, "{kind}.{} removes surplus but is unordered", list.key);
                }
            }
        }
    }

    #[test]
    fn library_chain_classes_carry_the_chain_reference() {
        for kind in ClassKind::iter() {
            if kind.def().library_chain {
                assert!(kind.def().reference("required_library").is_some());
            }
        }
    }

    #[test]
    fn container_rules() {
        assert!(ClassKind::SiteDirectory.is_root());
        assert!(ClassKind::EngineeringModel.is_root());
        assert!(ClassKind::Parameter
            .def()
            .container
            .accepts(ClassKind::ElementDefinition));
        assert!(!ClassKind::Parameter.def().container.accepts(ClassKind::SiteDirectory));
    }
}
