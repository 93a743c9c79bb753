use crate::core::growth::check_non_negative;
use crate::core::slab::validate_slabs;
use crate::utils::error::{PricingError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthType {
    Fixed,
    Percentage,
}

/// An independently growing usage dimension (seats, API calls, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub starting_units: f64,
    pub growth_type: GrowthType,
    pub growth_value: f64,
}

impl UnitType {
    pub fn new(
        id: impl Into<String>,
        starting_units: f64,
        growth_type: GrowthType,
        growth_value: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            starting_units,
            growth_type,
            growth_value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierFeeType {
    /// `units_in_tier × rate_per_unit`
    #[default]
    PerUnit,
    /// `rate_per_unit` charged once when any units land in the tier
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    #[serde(default)]
    pub id: String,
    pub from_units: f64,
    /// `None` means the tier is unbounded.
    pub to_units: Option<f64>,
    pub rate_per_unit: f64,
    #[serde(default)]
    pub fee_type: TierFeeType,
}

impl PricingTier {
    pub fn new(from_units: f64, to_units: Option<f64>, rate_per_unit: f64) -> Self {
        Self {
            id: String::new(),
            from_units,
            to_units,
            rate_per_unit,
            fee_type: TierFeeType::PerUnit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    Flat,
    PerUnit,
    Slab,
}

impl PricingType {
    /// Whether the fee depends on a unit count.
    pub fn is_usage_based(&self) -> bool {
        !matches!(self, PricingType::Flat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    #[serde(default)]
    pub unit_type_id: Option<String>,
    pub module_name: String,
    pub pricing_type: PricingType,
    #[serde(default)]
    pub monthly_fee: Option<f64>,
    #[serde(default)]
    pub one_time_fee: Option<f64>,
    #[serde(default)]
    pub module_minimum_fee: Option<f64>,
    #[serde(default)]
    pub slabs: Vec<PricingTier>,
    #[serde(default)]
    pub order: i32,
}

impl Module {
    pub fn flat(id: impl Into<String>, module_name: impl Into<String>, monthly_fee: f64) -> Self {
        Self {
            id: id.into(),
            unit_type_id: None,
            module_name: module_name.into(),
            pricing_type: PricingType::Flat,
            monthly_fee: Some(monthly_fee),
            one_time_fee: None,
            module_minimum_fee: None,
            slabs: Vec::new(),
            order: 0,
        }
    }

    pub fn per_unit(
        id: impl Into<String>,
        module_name: impl Into<String>,
        unit_type_id: impl Into<String>,
        price_per_unit: f64,
    ) -> Self {
        Self {
            unit_type_id: Some(unit_type_id.into()),
            pricing_type: PricingType::PerUnit,
            ..Self::flat(id, module_name, price_per_unit)
        }
    }

    pub fn slab(
        id: impl Into<String>,
        module_name: impl Into<String>,
        unit_type_id: impl Into<String>,
        slabs: Vec<PricingTier>,
    ) -> Self {
        Self {
            unit_type_id: Some(unit_type_id.into()),
            pricing_type: PricingType::Slab,
            monthly_fee: None,
            slabs,
            ..Self::flat(id, module_name, 0.0)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

/// List-shaped document the REST layer stores and serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelDocument {
    id: String,
    name: String,
    #[serde(default)]
    minimum_fee: f64,
    #[serde(default)]
    implementation_fee: f64,
    #[serde(default)]
    status: ModelStatus,
    #[serde(default)]
    modules: Vec<Module>,
    #[serde(default)]
    unit_types: Vec<UnitType>,
}

/// Root aggregate: a pricing model owning its unit types and modules.
///
/// Unit types and modules are keyed by id. Serialized, the model has the same
/// shape as the stored document, with both collections as lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument", into = "ModelDocument")]
pub struct PricingModel {
    pub id: String,
    pub name: String,
    pub minimum_fee: f64,
    pub implementation_fee: f64,
    pub status: ModelStatus,
    unit_types: BTreeMap<String, UnitType>,
    modules: BTreeMap<String, Module>,
}

impl PricingModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            minimum_fee: 0.0,
            implementation_fee: 0.0,
            status: ModelStatus::Draft,
            unit_types: BTreeMap::new(),
            modules: BTreeMap::new(),
        }
    }

    pub fn unit_type(&self, id: &str) -> Option<&UnitType> {
        self.unit_types.get(id)
    }

    pub fn unit_types(&self) -> impl Iterator<Item = &UnitType> {
        self.unit_types.values()
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Modules sorted by their `order` field, ties broken by id.
    pub fn modules_in_order(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.values().collect();
        modules.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        modules
    }

    pub fn add_unit_type(&mut self, unit_type: UnitType) -> Result<()> {
        if self.unit_types.contains_key(&unit_type.id) {
            return Err(PricingError::DuplicateIdError {
                kind: "unit type".to_string(),
                id: unit_type.id,
            });
        }
        check_unit_type(&unit_type)?;
        tracing::debug!("Adding unit type '{}' to model '{}'", unit_type.id, self.name);
        self.unit_types.insert(unit_type.id.clone(), unit_type);
        Ok(())
    }

    pub fn update_unit_type(&mut self, unit_type: UnitType) -> Result<()> {
        check_unit_type(&unit_type)?;
        match self.unit_types.get_mut(&unit_type.id) {
            Some(existing) => {
                *existing = unit_type;
                Ok(())
            }
            None => Err(PricingError::NotFoundError {
                kind: "unit type".to_string(),
                id: unit_type.id,
            }),
        }
    }

    /// Removes a unit type. Refused while any module is still priced by it.
    pub fn remove_unit_type(&mut self, id: &str) -> Result<UnitType> {
        if let Some(module) = self
            .modules
            .values()
            .find(|m| m.unit_type_id.as_deref() == Some(id))
        {
            return Err(PricingError::UnitTypeInUseError {
                unit_type_id: id.to_string(),
                module: module.module_name.clone(),
            });
        }
        self.unit_types
            .remove(id)
            .ok_or_else(|| PricingError::NotFoundError {
                kind: "unit type".to_string(),
                id: id.to_string(),
            })
    }

    pub fn add_module(&mut self, module: Module) -> Result<()> {
        if self.modules.contains_key(&module.id) {
            return Err(PricingError::DuplicateIdError {
                kind: "module".to_string(),
                id: module.id,
            });
        }
        self.check_module(&module)?;
        tracing::debug!("Adding module '{}' to model '{}'", module.module_name, self.name);
        self.modules.insert(module.id.clone(), module);
        Ok(())
    }

    pub fn update_module(&mut self, module: Module) -> Result<()> {
        if !self.modules.contains_key(&module.id) {
            return Err(PricingError::NotFoundError {
                kind: "module".to_string(),
                id: module.id,
            });
        }
        self.check_module(&module)?;
        self.modules.insert(module.id.clone(), module);
        Ok(())
    }

    pub fn remove_module(&mut self, id: &str) -> Result<Module> {
        self.modules
            .remove(id)
            .ok_or_else(|| PricingError::NotFoundError {
                kind: "module".to_string(),
                id: id.to_string(),
            })
    }

    /// Edit-time checks: usage-based modules need a known unit type, slab
    /// modules need a structurally valid tier set.
    fn check_module(&self, module: &Module) -> Result<()> {
        if module.pricing_type.is_usage_based() {
            let unit_type_id = module.unit_type_id.as_deref().unwrap_or_default();
            if !self.unit_types.contains_key(unit_type_id) {
                return Err(PricingError::UnknownUnitTypeError {
                    module: module.module_name.clone(),
                    unit_type_id: unit_type_id.to_string(),
                });
            }
        }
        if module.pricing_type == PricingType::Slab {
            let report = validate_slabs(&module.slabs);
            if !report.valid {
                return Err(PricingError::ValidationError {
                    errors: report.errors,
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<ModelDocument> for PricingModel {
    type Error = PricingError;

    fn try_from(doc: ModelDocument) -> Result<Self> {
        let mut unit_types = BTreeMap::new();
        for unit_type in doc.unit_types {
            if unit_types.contains_key(&unit_type.id) {
                return Err(PricingError::DuplicateIdError {
                    kind: "unit type".to_string(),
                    id: unit_type.id,
                });
            }
            unit_types.insert(unit_type.id.clone(), unit_type);
        }

        let mut modules = BTreeMap::new();
        for module in doc.modules {
            if modules.contains_key(&module.id) {
                return Err(PricingError::DuplicateIdError {
                    kind: "module".to_string(),
                    id: module.id,
                });
            }
            modules.insert(module.id.clone(), module);
        }

        Ok(Self {
            id: doc.id,
            name: doc.name,
            minimum_fee: doc.minimum_fee,
            implementation_fee: doc.implementation_fee,
            status: doc.status,
            unit_types,
            modules,
        })
    }
}

impl From<PricingModel> for ModelDocument {
    fn from(model: PricingModel) -> Self {
        let modules = model
            .modules_in_order()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        Self {
            id: model.id,
            name: model.name,
            minimum_fee: model.minimum_fee,
            implementation_fee: model.implementation_fee,
            status: model.status,
            modules,
            unit_types: model.unit_types.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    #[default]
    Monthly,
    Yearly,
}

impl FromStr for Interval {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Interval::Monthly),
            "yearly" | "year" | "annual" => Ok(Interval::Yearly),
            other => Err(PricingError::InvalidConfigValueError {
                field: "interval".to_string(),
                value: other.to_string(),
                reason: "expected 'monthly' or 'yearly'".to_string(),
            }),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Monthly => write!(f, "monthly"),
            Interval::Yearly => write!(f, "yearly"),
        }
    }
}

/// A user-entered unit count for one unit type at one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOverride {
    pub unit_type_id: String,
    pub period: u32,
    pub units: f64,
}

fn check_unit_type(unit_type: &UnitType) -> Result<()> {
    check_non_negative("starting_units", unit_type.starting_units)?;
    check_non_negative("growth_value", unit_type.growth_value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleFee {
    pub module_name: String,
    pub fee: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub module_fees: Vec<ModuleFee>,
    pub raw_total: f64,
    pub minimum_fee: f64,
    pub minimum_applied: bool,
    pub implementation_fee: f64,
    /// Module one-time fees; charged at period 0 and added to the total on top of the minimum floor.
    pub one_time_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub period: u32,
    pub date: NaiveDate,
    pub units: f64,
    pub total_fee: f64,
    pub breakdown: FeeBreakdown,
}

/// Output of the transform step, ready to be written out.
#[derive(Debug, Clone)]
pub struct ProjectionReport {
    pub model_name: String,
    pub rows: Vec<ProjectionResult>,
    pub csv_output: String,
    pub json_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats_model() -> PricingModel {
        let mut model = PricingModel::new("m1", "Starter");
        model
            .add_unit_type(UnitType::new("seats", 10.0, GrowthType::Fixed, 5.0))
            .unwrap();
        model
    }

    #[test]
    fn test_new_model_has_zero_fees_and_no_modules() {
        let model = PricingModel::new("m1", "Starter");
        assert_eq!(model.minimum_fee, 0.0);
        assert_eq!(model.implementation_fee, 0.0);
        assert_eq!(model.status, ModelStatus::Draft);
        assert_eq!(model.modules().count(), 0);
    }

    #[test]
    fn test_add_module_requires_known_unit_type() {
        let mut model = seats_model();
        let err = model
            .add_module(Module::per_unit("api", "API", "calls", 0.01))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownUnitTypeError { .. }));

        model
            .add_module(Module::per_unit("seat", "Seats", "seats", 12.0))
            .unwrap();
        assert!(model.module("seat").is_some());
    }

    #[test]
    fn test_add_module_rejects_invalid_slabs() {
        let mut model = seats_model();
        let slabs = vec![PricingTier::new(10.0, None, 5.0)];
        let err = model
            .add_module(Module::slab("tiered", "Tiered", "seats", slabs))
            .unwrap_err();
        assert!(matches!(err, PricingError::ValidationError { .. }));
    }

    #[test]
    fn test_remove_unit_type_in_use_is_refused() {
        let mut model = seats_model();
        model
            .add_module(Module::per_unit("seat", "Seats", "seats", 12.0))
            .unwrap();

        assert!(matches!(
            model.remove_unit_type("seats"),
            Err(PricingError::UnitTypeInUseError { .. })
        ));

        model.remove_module("seat").unwrap();
        assert!(model.remove_unit_type("seats").is_ok());
    }

    #[test]
    fn test_unit_type_edits_reject_negative_values() {
        let mut model = seats_model();
        let err = model
            .add_unit_type(UnitType::new("calls", -10.0, GrowthType::Fixed, 1.0))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidInputError { ref field, .. } if field == "starting_units"));
        assert!(model.unit_type("calls").is_none());

        let err = model
            .update_unit_type(UnitType::new("seats", 10.0, GrowthType::Percentage, -5.0))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidInputError { ref field, .. } if field == "growth_value"));
        assert_eq!(model.unit_type("seats").unwrap().growth_type, GrowthType::Fixed);
    }

    #[test]
    fn test_update_unit_type() {
        let mut model = seats_model();
        model
            .update_unit_type(UnitType::new("seats", 40.0, GrowthType::Percentage, 3.0))
            .unwrap();
        assert_eq!(model.unit_type("seats").unwrap().starting_units, 40.0);

        assert!(matches!(
            model.update_unit_type(UnitType::new("calls", 1.0, GrowthType::Fixed, 1.0)),
            Err(PricingError::NotFoundError { .. })
        ));
    }

    #[test]
    fn test_update_module() {
        let mut model = seats_model();
        model
            .add_module(Module::per_unit("seat", "Seats", "seats", 12.0))
            .unwrap();

        model
            .update_module(Module::per_unit("seat", "Seats", "seats", 15.0))
            .unwrap();
        assert_eq!(model.module("seat").unwrap().monthly_fee, Some(15.0));
        assert_eq!(model.modules().count(), 1);
    }

    #[test]
    fn test_update_missing_module_is_not_found() {
        let mut model = seats_model();
        assert!(matches!(
            model.update_module(Module::flat("ghost", "Ghost", 10.0)),
            Err(PricingError::NotFoundError { .. })
        ));
    }

    #[test]
    fn test_update_module_rejects_unknown_unit_type() {
        let mut model = seats_model();
        model
            .add_module(Module::per_unit("seat", "Seats", "seats", 12.0))
            .unwrap();

        let err = model
            .update_module(Module::per_unit("seat", "Seats", "calls", 12.0))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownUnitTypeError { .. }));
        assert_eq!(
            model.module("seat").unwrap().unit_type_id.as_deref(),
            Some("seats")
        );
    }

    #[test]
    fn test_update_module_rejects_gapped_slabs() {
        let mut model = seats_model();
        let valid = vec![
            PricingTier::new(0.0, Some(50.0), 10.0),
            PricingTier::new(50.0, None, 8.0),
        ];
        model
            .add_module(Module::slab("tiered", "Tiered", "seats", valid))
            .unwrap();

        let gapped = vec![
            PricingTier::new(0.0, Some(50.0), 10.0),
            PricingTier::new(60.0, None, 8.0),
        ];
        let err = model
            .update_module(Module::slab("tiered", "Tiered", "seats", gapped))
            .unwrap_err();
        match err {
            PricingError::ValidationError { errors } => {
                assert!(errors.iter().any(|e| e.contains("Gap")))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(model.module("tiered").unwrap().slabs[1].from_units, 50.0);
    }

    #[test]
    fn test_modules_in_order() {
        let mut model = seats_model();
        let mut b = Module::flat("b", "Support", 100.0);
        b.order = 2;
        let mut a = Module::flat("a", "Platform", 500.0);
        a.order = 1;
        model.add_module(b).unwrap();
        model.add_module(a).unwrap();

        let names: Vec<&str> = model
            .modules_in_order()
            .iter()
            .map(|m| m.module_name.as_str())
            .collect();
        assert_eq!(names, vec!["Platform", "Support"]);
    }

    #[test]
    fn test_document_deserialization() {
        let json = serde_json::json!({
            "id": "m1",
            "name": "Growth",
            "minimum_fee": 250.0,
            "unit_types": [
                {"id": "seats", "starting_units": 100, "growth_type": "percentage", "growth_value": 10}
            ],
            "modules": [
                {
                    "id": "core",
                    "module_name": "Core",
                    "pricing_type": "slab",
                    "unit_type_id": "seats",
                    "slabs": [
                        {"from_units": 0, "to_units": 100, "rate_per_unit": 100},
                        {"from_units": 100, "to_units": null, "rate_per_unit": 75}
                    ]
                }
            ]
        });

        let model: PricingModel = serde_json::from_value(json).unwrap();
        assert_eq!(model.minimum_fee, 250.0);
        assert_eq!(model.implementation_fee, 0.0);
        assert_eq!(model.module("core").unwrap().slabs.len(), 2);
        assert_eq!(
            model.unit_type("seats").unwrap().growth_type,
            GrowthType::Percentage
        );
    }

    #[test]
    fn test_document_with_duplicate_ids_is_rejected() {
        let json = serde_json::json!({
            "id": "m1",
            "name": "Dup",
            "modules": [
                {"id": "x", "module_name": "A", "pricing_type": "flat", "monthly_fee": 1},
                {"id": "x", "module_name": "B", "pricing_type": "flat", "monthly_fee": 2}
            ]
        });

        let result: std::result::Result<PricingModel, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_interval_from_str() {
        assert_eq!("Monthly".parse::<Interval>().unwrap(), Interval::Monthly);
        assert_eq!("yearly".parse::<Interval>().unwrap(), Interval::Yearly);
        assert!("weekly".parse::<Interval>().is_err());
    }
}
