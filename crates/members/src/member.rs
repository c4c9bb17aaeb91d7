use serde::{Deserialize, Serialize};

use storefront_core::{Address, AggregateRoot, DomainError, DomainResult, Entity, MemberId};

/// Member: an account that places orders.
///
/// The inverse orders collection is deliberately not materialized here;
/// "orders of a member" is a query against the order store keyed by
/// `member_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: String,
    address: Address,
}

impl Member {
    /// Register a new member.
    ///
    /// Duplicate-name detection needs the member store and is enforced by the
    /// registration operation, not here.
    pub fn register(name: impl Into<String>, address: Address) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id: MemberId::new(),
            name,
            address,
        })
    }

    /// Rehydrate a member from stored state.
    pub fn from_parts(id: MemberId, name: String, address: Address) -> Self {
        Self { id, name, address }
    }

    pub fn id_typed(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Change the member's display name.
    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Member {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_address() -> Address {
        Address::new("Seoul", "Teheran-ro 1", "06000")
    }

    #[test]
    fn register_keeps_name_and_address() {
        let member = Member::register("kim", test_address()).unwrap();
        assert_eq!(member.name(), "kim");
        assert_eq!(member.address(), &test_address());
    }

    #[test]
    fn register_rejects_empty_name() {
        let err = Member::register("   ", test_address()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn rename_replaces_the_name() {
        let mut member = Member::register("kim", test_address()).unwrap();
        member.rename("lee").unwrap();
        assert_eq!(member.name(), "lee");
    }

    #[test]
    fn rename_rejects_blank_name_and_keeps_old_one() {
        let mut member = Member::register("kim", test_address()).unwrap();
        let err = member.rename("").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank name"),
        }
        assert_eq!(member.name(), "kim");
    }

    proptest! {
        #[test]
        fn register_accepts_any_non_blank_name(name in "[a-zA-Z][a-zA-Z0-9 ]{0,30}") {
            let member = Member::register(name.clone(), test_address()).unwrap();
            prop_assert_eq!(member.name(), name.as_str());
        }
    }
}
