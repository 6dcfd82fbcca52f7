//! Combination-engine scenarios driven through a third-party index kind.
//!
//! The dataset engine must reconcile indexes it knows nothing about purely
//! through the `CoordIndex` hooks, so these tests define their own index
//! kind (a unit-of-measure tag with an adopt-the-defined-side merge rule)
//! and check that align, merge, and concat behave the same way they do for
//! the built-in `ValueIndex`.

use std::any::Any;

use labgrid::{
    merge_all, truncate_repr, AlignError, CoordIndex, CoordValue, Dataset, ExtensionRegistry,
    ValueIndex, Variable,
};

/// Minimal metadata index: tags a coordinate with a unit string. An
/// untagged index adopts the other side's unit on merge; two different
/// units conflict.
#[derive(Debug, Clone, PartialEq)]
struct UnitIndex {
    unit: Option<String>,
}

impl UnitIndex {
    fn new(unit: Option<&str>) -> Self {
        Self {
            unit: unit.map(str::to_string),
        }
    }
}

impl CoordIndex for UnitIndex {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn CoordIndex> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn CoordIndex) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => match (&self.unit, &other.unit) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            },
            None => false,
        }
    }

    fn merge(&self, other: &dyn CoordIndex) -> Option<Box<dyn CoordIndex>> {
        let other = other.as_any().downcast_ref::<Self>()?;
        let unit = match (&self.unit, &other.unit) {
            (Some(a), Some(b)) if a != b => return None,
            (Some(a), _) => Some(a.clone()),
            (None, b) => b.clone(),
        };
        Some(Box::new(Self { unit }))
    }

    fn inline_repr(&self, max_width: usize) -> String {
        let unit = self.unit.as_deref().unwrap_or("None");
        truncate_repr(&format!("UnitIndex (unit={unit})"), max_width)
    }
}

fn tagged(unit: Option<&str>) -> Dataset {
    Dataset::new()
        .assign_coord("height", CoordValue::scalar(0.0))
        .set_index("height", Box::new(UnitIndex::new(unit)))
        .expect("coordinate was just assigned")
}

#[test]
fn align_goes_through_the_hook_for_foreign_kinds() {
    tagged(Some("m")).align(&tagged(Some("m"))).unwrap();
    tagged(Some("m")).align(&tagged(None)).unwrap();

    let err = tagged(Some("m")).align(&tagged(Some("ft"))).unwrap_err();
    match err {
        AlignError::IndexConflict { coord, left, right } => {
            assert_eq!(coord, "height");
            assert!(left.contains("unit=m"));
            assert!(right.contains("unit=ft"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn merge_uses_the_custom_reconciliation_rule() {
    let merged = tagged(None).merge(&tagged(Some("m"))).unwrap();
    let index = merged
        .index("height")
        .and_then(|i| i.as_any().downcast_ref::<UnitIndex>())
        .expect("merged index keeps its kind");
    assert_eq!(index.unit.as_deref(), Some("m"));

    assert!(matches!(
        tagged(Some("m")).merge(&tagged(Some("ft"))),
        Err(AlignError::IndexConflict { .. })
    ));
}

#[test]
fn cross_kind_indexes_never_compare_equal() {
    let unit = UnitIndex::new(Some("m"));
    let value = ValueIndex::from_coord("height", &CoordValue::scalar(0.0));
    assert!(!unit.equals(&value));
    assert!(!value.equals(&unit));
    assert!(unit.merge(&value).is_none());
}

#[test]
fn merge_all_reconciles_pairwise_left_to_right() {
    // an untagged left side adopts "m"; a later "ft" only conflicts once
    // the reduction reaches it
    let merged = merge_all([&tagged(None), &tagged(Some("m")), &tagged(Some("m"))]).unwrap();
    assert!(merged
        .index("height")
        .is_some_and(|i| i.equals(&UnitIndex::new(Some("m")))));

    assert!(matches!(
        merge_all([&tagged(None), &tagged(Some("m")), &tagged(Some("ft"))]),
        Err(AlignError::IndexConflict { .. })
    ));
}

#[test]
fn concat_reconciles_off_dim_indexes_and_drops_stale_labels() {
    let left = tagged(Some("m"))
        .assign_coord("x", CoordValue::array("x", vec![1.0, 2.0]))
        .assign_var("v", Variable::new(vec!["x".into()], vec![0.1, 0.2]));
    let left = left
        .set_index(
            "x",
            Box::new(ValueIndex::from_coord(
                "x",
                &CoordValue::array("x", vec![1.0, 2.0]),
            )),
        )
        .unwrap();
    let right = tagged(None)
        .assign_coord("x", CoordValue::array("x", vec![3.0]))
        .assign_var("v", Variable::new(vec!["x".into()], vec![0.3]));
    let right = right
        .set_index(
            "x",
            Box::new(ValueIndex::from_coord(
                "x",
                &CoordValue::array("x", vec![3.0]),
            )),
        )
        .unwrap();

    let joined = left.concat(&right, "x").unwrap();
    assert_eq!(joined.var("v").unwrap().data, vec![0.1, 0.2, 0.3]);
    // both sides' label indexes over the concatenated coordinate disagree
    // by construction; they are dropped as stale, the metadata index on
    // "height" is not
    assert!(joined.index("x").is_none());
    assert!(joined
        .index("height")
        .is_some_and(|i| i.equals(&UnitIndex::new(Some("m")))));
}

#[test]
fn concat_surfaces_off_dim_conflicts() {
    let left = tagged(Some("m"))
        .assign_coord("x", CoordValue::array("x", vec![1.0]))
        .assign_var("v", Variable::new(vec!["x".into()], vec![0.1]));
    let right = tagged(Some("ft"))
        .assign_coord("x", CoordValue::array("x", vec![2.0]))
        .assign_var("v", Variable::new(vec!["x".into()], vec![0.2]));
    assert!(matches!(
        left.concat(&right, "x"),
        Err(AlignError::IndexConflict { ref coord, .. }) if coord == "height"
    ));
}

// ── capability registry, as an extension crate would use it ──────────────

trait UnitAware {
    fn unit(&self) -> Option<&str>;
}

impl UnitAware for UnitIndex {
    fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

#[test]
fn registry_discovers_capabilities_on_foreign_indexes() {
    ExtensionRegistry::register::<dyn UnitAware, UnitIndex>(|any| {
        any.downcast_ref::<UnitIndex>().map(|i| i as &dyn UnitAware)
    });

    let ds = tagged(Some("m"));
    let index = ds.index("height").unwrap();
    let aware = ExtensionRegistry::lookup::<dyn UnitAware>(index.as_any())
        .expect("registered kind resolves");
    assert_eq!(aware.unit(), Some("m"));

    let value = ValueIndex::from_coord("height", &CoordValue::scalar(0.0));
    assert!(ExtensionRegistry::lookup::<dyn UnitAware>(value.as_any()).is_none());
}
