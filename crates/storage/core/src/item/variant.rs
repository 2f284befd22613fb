use std::fmt;

use crate::common::Position;

/// Reference to an item kind defined by the host game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub i32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orientation stored alongside a [`ItemVariant::Located`] item.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LookVector {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Discriminant of an [`ItemVariant`], also used as the persisted record tag.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::FromRepr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(i32)]
pub enum VariantTag {
    PlainStack = 0,
    SubtypedStack = 1,
    Single = 2,
    Durability = 3,
    Charged = 4,
    Located = 5,
}

impl VariantTag {
    pub const fn is_stackable(self) -> bool {
        matches!(self, Self::PlainStack | Self::SubtypedStack)
    }
}

/// One stored item.
///
/// Only the two stack variants carry a mutable `amount`; every other variant
/// is a single unit. `PartialEq` compares every field including the amount,
/// while [`ItemVariant::identity_eq`] decides whether two items belong in the
/// same bin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemVariant {
    PlainStack {
        id: ItemId,
        amount: u32,
    },
    /// A stack whose kind is refined by a sub-kind and value, e.g. a block
    /// type plus its material index.
    SubtypedStack {
        id: ItemId,
        sub_kind: i32,
        sub_value: i32,
        amount: u32,
    },
    Single {
        id: ItemId,
    },
    Durability {
        id: ItemId,
        current: i32,
        max: i32,
    },
    Charged {
        id: ItemId,
        level: i32,
    },
    Located {
        id: ItemId,
        location: Position,
        look: LookVector,
    },
}

impl ItemVariant {
    pub const fn plain_stack(id: ItemId, amount: u32) -> Self {
        Self::PlainStack { id, amount }
    }

    pub const fn subtyped_stack(id: ItemId, sub_kind: i32, sub_value: i32, amount: u32) -> Self {
        Self::SubtypedStack {
            id,
            sub_kind,
            sub_value,
            amount,
        }
    }

    pub const fn single(id: ItemId) -> Self {
        Self::Single { id }
    }

    pub const fn durability(id: ItemId, current: i32, max: i32) -> Self {
        Self::Durability { id, current, max }
    }

    pub const fn charged(id: ItemId, level: i32) -> Self {
        Self::Charged { id, level }
    }

    pub const fn located(id: ItemId, location: Position, look: LookVector) -> Self {
        Self::Located { id, location, look }
    }

    pub const fn tag(&self) -> VariantTag {
        match self {
            Self::PlainStack { .. } => VariantTag::PlainStack,
            Self::SubtypedStack { .. } => VariantTag::SubtypedStack,
            Self::Single { .. } => VariantTag::Single,
            Self::Durability { .. } => VariantTag::Durability,
            Self::Charged { .. } => VariantTag::Charged,
            Self::Located { .. } => VariantTag::Located,
        }
    }

    pub const fn id(&self) -> ItemId {
        match self {
            Self::PlainStack { id, .. }
            | Self::SubtypedStack { id, .. }
            | Self::Single { id }
            | Self::Durability { id, .. }
            | Self::Charged { id, .. }
            | Self::Located { id, .. } => *id,
        }
    }

    pub const fn is_stackable(&self) -> bool {
        self.tag().is_stackable()
    }

    /// Units represented by this item; singleton variants always count as one.
    pub const fn amount(&self) -> u32 {
        match self {
            Self::PlainStack { amount, .. } | Self::SubtypedStack { amount, .. } => *amount,
            _ => 1,
        }
    }

    /// Equality ignoring the amount.
    ///
    /// Two items are identity-equal when they share the tag, the kind id and
    /// every tag-specific secondary field.
    pub fn identity_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PlainStack { id: a, .. }, Self::PlainStack { id: b, .. })
            | (Self::Single { id: a }, Self::Single { id: b }) => a == b,
            (
                Self::SubtypedStack {
                    id: a,
                    sub_kind: ak,
                    sub_value: av,
                    ..
                },
                Self::SubtypedStack {
                    id: b,
                    sub_kind: bk,
                    sub_value: bv,
                    ..
                },
            ) => a == b && ak == bk && av == bv,
            (
                Self::Durability {
                    id: a,
                    current: ac,
                    max: am,
                },
                Self::Durability {
                    id: b,
                    current: bc,
                    max: bm,
                },
            ) => a == b && ac == bc && am == bm,
            (Self::Charged { id: a, level: al }, Self::Charged { id: b, level: bl }) => {
                a == b && al == bl
            }
            (
                Self::Located {
                    id: a,
                    location: al,
                    look: ak,
                },
                Self::Located {
                    id: b,
                    location: bl,
                    look: bk,
                },
            ) => a == b && al == bl && ak == bk,
            _ => false,
        }
    }

    /// True when both items are stacks that may share a bin.
    pub fn stacks_with(&self, other: &Self) -> bool {
        self.is_stackable() && other.is_stackable() && self.identity_eq(other)
    }

    /// Builds a standalone copy carrying `amount` units.
    ///
    /// Singleton variants ignore the amount and come back unchanged.
    pub fn with_amount(&self, amount: u32) -> Self {
        let mut copy = self.clone();
        if let Self::PlainStack { amount: a, .. } | Self::SubtypedStack { amount: a, .. } =
            &mut copy
        {
            *a = amount;
        }
        copy
    }

    /// Checks the per-tag invariants a stored item must satisfy.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::PlainStack { amount, .. } | Self::SubtypedStack { amount, .. } => *amount > 0,
            Self::Single { .. } => true,
            Self::Durability { current, max, .. } => *max >= 0 && (0..=*max).contains(current),
            Self::Charged { level, .. } => *level >= 0,
            Self::Located { look, .. } => look.is_finite(),
        }
    }

    pub(crate) fn grow(&mut self, by: u32) {
        match self {
            Self::PlainStack { amount, .. } | Self::SubtypedStack { amount, .. } => *amount += by,
            other => tracing::warn!("tried to grow a non-stack item {}", other),
        }
    }

    pub(crate) fn shrink(&mut self, by: u32) {
        match self {
            Self::PlainStack { amount, .. } | Self::SubtypedStack { amount, .. } => {
                *amount = amount.saturating_sub(by)
            }
            other => tracing::warn!("tried to shrink a non-stack item {}", other),
        }
    }
}

impl fmt::Display for ItemVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainStack { id, amount } => write!(f, "Item {id} x{amount}"),
            Self::SubtypedStack {
                id,
                sub_kind,
                sub_value,
                amount,
            } => write!(f, "Cube {id} ({sub_kind}:{sub_value}) x{amount}"),
            Self::Single { id } => write!(f, "Item {id}"),
            Self::Durability { id, current, max } => write!(f, "Tool {id} [{current}/{max}]"),
            Self::Charged { id, level } => write!(f, "Charged {id} ({level}%)"),
            Self::Located { id, location, .. } => write!(f, "Locator {id} @ {location}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORE: ItemId = ItemId(5);

    #[test]
    fn identity_ignores_amount() {
        let a = ItemVariant::plain_stack(ORE, 3);
        let b = ItemVariant::plain_stack(ORE, 40);
        assert!(a.identity_eq(&b));
        assert!(a.stacks_with(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn identity_is_scoped_to_tag_and_kind() {
        let stack = ItemVariant::plain_stack(ORE, 1);
        let single = ItemVariant::single(ORE);
        assert!(!stack.identity_eq(&single));
        assert!(!single.identity_eq(&stack));
        assert!(!stack.identity_eq(&ItemVariant::plain_stack(ItemId(6), 1)));
    }

    #[test]
    fn subtyped_stacks_compare_secondary_fields() {
        let granite = ItemVariant::subtyped_stack(ORE, 12, 1, 4);
        assert!(granite.identity_eq(&ItemVariant::subtyped_stack(ORE, 12, 1, 9)));
        assert!(!granite.identity_eq(&ItemVariant::subtyped_stack(ORE, 12, 2, 4)));
        assert!(!granite.identity_eq(&ItemVariant::subtyped_stack(ORE, 13, 1, 4)));
    }

    #[test]
    fn singleton_variants_compare_their_state() {
        let worn = ItemVariant::durability(ORE, 10, 50);
        assert!(worn.identity_eq(&ItemVariant::durability(ORE, 10, 50)));
        assert!(!worn.identity_eq(&ItemVariant::durability(ORE, 11, 50)));
        assert!(!worn.stacks_with(&worn.clone()));

        let battery = ItemVariant::charged(ORE, 80);
        assert!(!battery.identity_eq(&ItemVariant::charged(ORE, 79)));

        let here = Position::new(1, 2, 3);
        let marker = ItemVariant::located(ORE, here, LookVector::new(0.0, 1.0, 0.0));
        assert!(marker.identity_eq(&ItemVariant::located(ORE, here, LookVector::new(0.0, 1.0, 0.0))));
        assert!(!marker.identity_eq(&ItemVariant::located(
            ORE,
            here,
            LookVector::new(1.0, 0.0, 0.0)
        )));
    }

    #[test]
    fn with_amount_only_touches_stacks() {
        let stack = ItemVariant::subtyped_stack(ORE, 1, 1, 9);
        assert_eq!(stack.with_amount(2).amount(), 2);

        let tool = ItemVariant::durability(ORE, 1, 2);
        assert_eq!(tool.with_amount(7), tool);
        assert_eq!(tool.amount(), 1);
    }

    #[test]
    fn well_formedness_per_tag() {
        assert!(!ItemVariant::plain_stack(ORE, 0).is_well_formed());
        assert!(!ItemVariant::durability(ORE, 5, 4).is_well_formed());
        assert!(!ItemVariant::charged(ORE, -1).is_well_formed());
        assert!(
            !ItemVariant::located(ORE, Position::ORIGIN, LookVector::new(f32::NAN, 0.0, 0.0))
                .is_well_formed()
        );
        assert!(ItemVariant::single(ORE).is_well_formed());
    }

    #[test]
    fn tags_round_trip_through_repr() {
        use strum::IntoEnumIterator;
        for tag in VariantTag::iter() {
            assert_eq!(VariantTag::from_repr(tag as i32), Some(tag));
        }
        assert_eq!(VariantTag::from_repr(42), None);
    }
}
