//! Portal table allow-list
//!
//! Table names are interpolated into SQL as identifiers, so free-form client
//! input must never reach that position. Every request path parses the table
//! segment against this enum first; the enum also pins down the primary-key
//! column name and the per-table required fields, so all endpoints share one
//! id-discovery strategy.

use std::fmt;

use crate::error::ApiError;

/// A table staff may edit through the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tenders,
    Results,
    MedicalFaculty,
    MedicalResidents,
    NonMedicalContractual,
    NonMedicalPermanent,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Tenders,
        Table::Results,
        Table::MedicalFaculty,
        Table::MedicalResidents,
        Table::NonMedicalContractual,
        Table::NonMedicalPermanent,
    ];

    /// Parse a URL path segment against the allow-list.
    pub fn from_name(name: &str) -> Result<Self, ApiError> {
        match name {
            "tenders" => Ok(Table::Tenders),
            "results" => Ok(Table::Results),
            "medical_faculty" => Ok(Table::MedicalFaculty),
            "medical_residents" => Ok(Table::MedicalResidents),
            "nonmedical_contractual" => Ok(Table::NonMedicalContractual),
            "nonmedical_permanent" => Ok(Table::NonMedicalPermanent),
            other => Err(ApiError::Schema(other.to_string())),
        }
    }

    /// SQL identifier for the table.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Tenders => "tenders",
            Table::Results => "results",
            Table::MedicalFaculty => "medical_faculty",
            Table::MedicalResidents => "medical_residents",
            Table::NonMedicalContractual => "nonmedical_contractual",
            Table::NonMedicalPermanent => "nonmedical_permanent",
        }
    }

    /// Auto-generated primary-key column.
    pub fn id_column(&self) -> &'static str {
        match self {
            Table::Tenders => "TenderID",
            Table::Results => "ResultID",
            Table::MedicalFaculty => "MedicalFacultyID",
            Table::MedicalResidents => "MedicalResidentID",
            Table::NonMedicalContractual => "NonMedicalContractualID",
            Table::NonMedicalPermanent => "NonMedicalPermanentID",
        }
    }

    /// Fields a create payload must carry. Tables without a declared list
    /// accept any payload subset.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Table::Tenders => &[
                "TenderName",
                "TenderReferenceNo",
                "StartDate",
                "EndDate",
                "DocumentPath",
            ],
            Table::Results => &[
                "Title",
                "Department",
                "ReferenceNo",
                "ResultDate",
                "DocumentPath",
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse() {
        for table in Table::ALL {
            assert_eq!(Table::from_name(table.name()).unwrap(), table);
        }
    }

    #[test]
    fn unknown_name_is_a_schema_error() {
        let error = Table::from_name("admin; DROP TABLE admin").unwrap_err();
        assert!(matches!(error, ApiError::Schema(_)));
    }

    #[test]
    fn id_columns_follow_the_naming_convention() {
        assert_eq!(Table::Tenders.id_column(), "TenderID");
        assert_eq!(Table::Results.id_column(), "ResultID");
        assert_eq!(
            Table::NonMedicalContractual.id_column(),
            "NonMedicalContractualID"
        );
    }

    #[test]
    fn only_tenders_and_results_declare_required_fields() {
        assert!(!Table::Tenders.required_fields().is_empty());
        assert!(!Table::Results.required_fields().is_empty());
        assert!(Table::MedicalFaculty.required_fields().is_empty());
        assert!(Table::NonMedicalPermanent.required_fields().is_empty());
    }
}
