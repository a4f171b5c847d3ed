//! # Validation Module
//!
//! Field rules for every entity and the normalization of input payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Client forms / bulk import rows                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── required fields (non-empty after trim)                            │
//! │  ├── enumerated fields (type ∈ {product, service})                     │
//! │  └── numeric ranges (prices ≥ 0, sale quantity > 0)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints scoped to a store or business                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storekeep_core::validation::{validate_required, validate_store_code};
//!
//! assert_eq!(validate_required("name", "  Widget ").unwrap(), "Widget");
//! assert_eq!(validate_store_code("nyc-1").unwrap(), "NYC-1");
//! ```

use crate::error::ValidationError;
use crate::types::{
    Business, BusinessUpdate, Customer, CustomerUpdate, Inventory, InventoryDraft, InventoryKind,
    InventoryUpdate, NewBusiness, NewCustomer, NewInventory, NewStaff, NewStore, SaleRequest,
    Staff, StaffUpdate, Store, StoreUpdate,
};
use crate::{MAX_CUSTOMER_NUMBER, MAX_NAME_LENGTH, MAX_STORE_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is non-empty after trimming.
///
/// ## Returns
/// The trimmed value.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

/// Validates a display name (business, store, customer, staff, item).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use storekeep_core::validation::validate_name;
///
/// assert!(validate_name("name", "Widget").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value)
}

/// Validates a store code and returns it upper-cased.
///
/// ## Rules
/// - Must not be empty
/// - At most 16 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_store_code(code: &str) -> ValidationResult<String> {
    let code = validate_required("code", code)?;

    if code.len() > MAX_STORE_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_STORE_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a phone number.
///
/// ## Rules
/// - Required
/// - 4 to 20 characters
/// - Digits, spaces, hyphens and parentheses, with an optional leading `+`
pub fn validate_phone(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;

    if !(4..=20).contains(&value.len()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be between 4 and 20 characters".to_string(),
        });
    }

    let body = value.strip_prefix('+').unwrap_or(&value);
    let valid = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
        && body.chars().any(|c| c.is_ascii_digit());

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only digits, spaces, hyphens and parentheses".to_string(),
        });
    }

    Ok(value)
}

/// Validates an international dialling prefix such as `+1` or `+971`.
pub fn validate_country_code(value: &str) -> ValidationResult<String> {
    let value = validate_required("countryCode", value)?;

    let digits = value.strip_prefix('+').unwrap_or("");
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "countryCode".to_string(),
            reason: "must be '+' followed by 1 to 4 digits".to_string(),
        });
    }

    Ok(value)
}

/// Validates an optional email address.
///
/// Blank input is treated as absent.
pub fn validate_email(value: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(value) = normalize_optional(value) else {
        return Ok(None);
    };

    let mut parts = value.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        _ => false,
    };

    if !valid || value.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(Some(value))
}

/// Trims an optional string; blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price or pay amount in cents (zero allowed).
///
/// ## Example
/// ```rust
/// use storekeep_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sellingPrice", 2500).is_ok());
/// assert!(validate_price_cents("sellingPrice", 0).is_ok());
/// assert!(validate_price_cents("sellingPrice", -1).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity (zero allowed).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the quantity of a sale. The upper bound is the stock on hand,
/// checked by the sale itself.
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an explicitly supplied customer number.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed MAX_CUSTOMER_NUMBER
pub fn validate_customer_number(number: i64) -> ValidationResult<()> {
    if number <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "customerNumber".to_string(),
        });
    }

    if number > MAX_CUSTOMER_NUMBER {
        return Err(ValidationError::OutOfRange {
            field: "customerNumber".to_string(),
            min: 1,
            max: MAX_CUSTOMER_NUMBER,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use storekeep_core::validation::validate_uuid;
///
/// assert!(validate_uuid("storeId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("storeId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    let id = validate_required(field, id)?;

    uuid::Uuid::parse_str(&id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Payload normalization
// =============================================================================

impl NewBusiness {
    /// Returns a trimmed copy, or the first field error.
    pub fn validate(&self) -> ValidationResult<NewBusiness> {
        Ok(NewBusiness {
            name: validate_name("name", &self.name)?,
            address: normalize_optional(self.address.as_deref()),
            phone: match normalize_optional(self.phone.as_deref()) {
                Some(phone) => Some(validate_phone("phone", &phone)?),
                None => None,
            },
            email: validate_email(self.email.as_deref())?,
        })
    }
}

impl BusinessUpdate {
    /// Applies the update to `business`, validating every touched field.
    pub fn apply(&self, business: &mut Business) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            business.name = validate_name("name", name)?;
        }
        if let Some(address) = &self.address {
            business.address = normalize_optional(Some(address));
        }
        if let Some(phone) = &self.phone {
            business.phone = match normalize_optional(Some(phone)) {
                Some(phone) => Some(validate_phone("phone", &phone)?),
                None => None,
            };
        }
        if let Some(email) = &self.email {
            business.email = validate_email(Some(email))?;
        }
        Ok(())
    }
}

impl NewStore {
    pub fn validate(&self) -> ValidationResult<NewStore> {
        Ok(NewStore {
            name: validate_name("name", &self.name)?,
            code: validate_store_code(&self.code)?,
            is_active: self.is_active,
        })
    }
}

impl StoreUpdate {
    pub fn apply(&self, store: &mut Store) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            store.name = validate_name("name", name)?;
        }
        if let Some(code) = &self.code {
            store.code = validate_store_code(code)?;
        }
        Ok(())
    }
}

impl NewCustomer {
    pub fn validate(&self) -> ValidationResult<NewCustomer> {
        if let Some(number) = self.customer_number {
            validate_customer_number(number)?;
        }

        Ok(NewCustomer {
            name: validate_name("name", &self.name)?,
            mobile_number: validate_phone("mobileNumber", &self.mobile_number)?,
            country_code: validate_country_code(&self.country_code)?,
            address: normalize_optional(self.address.as_deref()),
            customer_number: self.customer_number,
        })
    }
}

impl CustomerUpdate {
    /// Customer numbers are immutable and not part of the update.
    pub fn apply(&self, customer: &mut Customer) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            customer.name = validate_name("name", name)?;
        }
        if let Some(mobile) = &self.mobile_number {
            customer.mobile_number = validate_phone("mobileNumber", mobile)?;
        }
        if let Some(code) = &self.country_code {
            customer.country_code = validate_country_code(code)?;
        }
        if let Some(address) = &self.address {
            customer.address = normalize_optional(Some(address));
        }
        Ok(())
    }
}

impl NewStaff {
    pub fn validate(&self) -> ValidationResult<NewStaff> {
        validate_price_cents("payPerMonth", self.pay_per_month_cents)?;

        Ok(NewStaff {
            name: validate_name("name", &self.name)?,
            staff_number: validate_name("staffNumber", &self.staff_number)?,
            mobile_number: validate_phone("mobileNumber", &self.mobile_number)?,
            country_code: validate_country_code(&self.country_code)?,
            pay_per_month_cents: self.pay_per_month_cents,
            signed_contract: self.signed_contract,
        })
    }
}

impl StaffUpdate {
    pub fn apply(&self, staff: &mut Staff) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            staff.name = validate_name("name", name)?;
        }
        if let Some(number) = &self.staff_number {
            staff.staff_number = validate_name("staffNumber", number)?;
        }
        if let Some(mobile) = &self.mobile_number {
            staff.mobile_number = validate_phone("mobileNumber", mobile)?;
        }
        if let Some(code) = &self.country_code {
            staff.country_code = validate_country_code(code)?;
        }
        if let Some(pay) = self.pay_per_month_cents {
            validate_price_cents("payPerMonth", pay)?;
            staff.pay_per_month_cents = pay;
        }
        if let Some(signed) = self.signed_contract {
            staff.signed_contract = signed;
        }
        Ok(())
    }
}

impl NewInventory {
    /// Parses the kind and checks prices and stock.
    ///
    /// Services carry no stock, so their quantity is stored as 0.
    pub fn validate(&self) -> ValidationResult<InventoryDraft> {
        let name = validate_name("name", &self.name)?;
        let kind = InventoryKind::parse(&self.kind)?;
        validate_price_cents("costPrice", self.cost_price_cents)?;
        validate_price_cents("sellingPrice", self.selling_price_cents)?;
        validate_stock_quantity(self.quantity)?;

        Ok(InventoryDraft {
            name,
            kind,
            cost_price_cents: self.cost_price_cents,
            selling_price_cents: self.selling_price_cents,
            quantity: if kind.tracks_stock() { self.quantity } else { 0 },
        })
    }
}

impl InventoryUpdate {
    /// Stock is not part of the update; it changes through sales and
    /// stock adjustments only.
    pub fn apply(&self, item: &mut Inventory) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            item.name = validate_name("name", name)?;
        }
        if let Some(kind) = &self.kind {
            item.kind = InventoryKind::parse(kind)?;
        }
        if let Some(cost) = self.cost_price_cents {
            validate_price_cents("costPrice", cost)?;
            item.cost_price_cents = cost;
        }
        if let Some(price) = self.selling_price_cents {
            validate_price_cents("sellingPrice", price)?;
            item.selling_price_cents = price;
        }
        Ok(())
    }
}

impl SaleRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("storeId", &self.store_id)?;
        validate_required("inventoryId", &self.inventory_id)?;
        validate_required("staffId", &self.staff_id)?;
        validate_required("customerId", &self.customer_id)?;
        validate_sale_quantity(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_validate_required_trims() {
        assert_eq!(validate_required("name", "  NYC  ").unwrap(), "NYC");
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", " \t ").is_err());
    }

    #[test]
    fn test_validate_name_length() {
        assert!(validate_name("name", &"A".repeat(200)).is_ok());
        assert!(matches!(
            validate_name("name", &"A".repeat(201)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_store_code() {
        assert_eq!(validate_store_code("nyc").unwrap(), "NYC");
        assert_eq!(validate_store_code(" la_2 ").unwrap(), "LA_2");
        assert!(validate_store_code("").is_err());
        assert!(validate_store_code("has space").is_err());
        assert!(validate_store_code(&"A".repeat(17)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("mobileNumber", "555-0100").is_ok());
        assert!(validate_phone("mobileNumber", "+1 (555) 010-0100").is_ok());
        assert!(validate_phone("mobileNumber", "12").is_err());
        assert!(validate_phone("mobileNumber", "call me").is_err());
        assert!(validate_phone("mobileNumber", "----").is_err());
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("+1").is_ok());
        assert!(validate_country_code("+971").is_ok());
        assert!(validate_country_code("1").is_err());
        assert!(validate_country_code("+12345").is_err());
        assert!(validate_country_code("+ab").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(None).unwrap(), None);
        assert_eq!(validate_email(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_email(Some(" owner@example.com ")).unwrap(),
            Some("owner@example.com".to_string())
        );
        assert!(validate_email(Some("nope")).is_err());
        assert!(validate_email(Some("a@b@c.com")).is_err());
        assert!(validate_email(Some("@example.com")).is_err());
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(250_000).is_ok());
        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_customer_number() {
        assert!(validate_customer_number(1).is_ok());
        assert!(validate_customer_number(MAX_CUSTOMER_NUMBER).is_ok());
        assert!(validate_customer_number(0).is_err());
        assert!(matches!(
            validate_customer_number(MAX_CUSTOMER_NUMBER + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_customer_number(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents("costPrice", 0).is_ok());
        assert!(validate_price_cents("costPrice", -100).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }

    #[test]
    fn test_new_inventory_rejects_unknown_type() {
        let payload = NewInventory {
            name: "Widget".to_string(),
            kind: "gadget".to_string(),
            cost_price_cents: 1000,
            selling_price_cents: 2500,
            quantity: 100,
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.field(), "type");
    }

    #[test]
    fn test_new_inventory_service_has_no_stock() {
        let payload = NewInventory {
            name: " Repair ".to_string(),
            kind: "service".to_string(),
            cost_price_cents: 0,
            selling_price_cents: 5000,
            quantity: 40,
        };
        let draft = payload.validate().unwrap();
        assert_eq!(draft.name, "Repair");
        assert_eq!(draft.kind, InventoryKind::Service);
        assert_eq!(draft.quantity, 0);
    }

    #[test]
    fn test_new_store_upper_cases_code() {
        let store = NewStore {
            name: " New York ".to_string(),
            code: "nyc".to_string(),
            is_active: true,
        }
        .validate()
        .unwrap();
        assert_eq!(store.name, "New York");
        assert_eq!(store.code, "NYC");
    }

    #[test]
    fn test_customer_update_keeps_untouched_fields() {
        let now = Utc::now();
        let mut customer = Customer {
            id: "c1".to_string(),
            store_id: "s1".to_string(),
            name: "Ada".to_string(),
            customer_number: 7,
            mobile_number: "555-0100".to_string(),
            country_code: "+1".to_string(),
            address: Some("1 Main St".to_string()),
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        let update = CustomerUpdate {
            name: Some(" Ada Lovelace ".to_string()),
            address: Some("".to_string()),
            ..Default::default()
        };
        update.apply(&mut customer).unwrap();

        assert_eq!(customer.name, "Ada Lovelace");
        assert_eq!(customer.address, None);
        assert_eq!(customer.mobile_number, "555-0100");
        assert_eq!(customer.customer_number, 7);
    }

    #[test]
    fn test_sale_request_validation() {
        let request = SaleRequest {
            store_id: "s1".to_string(),
            inventory_id: "i1".to_string(),
            quantity: 0,
            staff_id: "st1".to_string(),
            customer_id: "c1".to_string(),
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::MustBePositive { .. })
        ));
    }
}
