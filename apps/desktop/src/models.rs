use chrono::NaiveDateTime;
use mvc_core::{fields, Field, Model};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmpModel {
    pub id: i64,
    pub name: String,
    pub sex: bool,
    pub birthday: Option<NaiveDateTime>,
}

impl Model for EmpModel {
    const NAME: &'static str = "EmpModel";

    fn fields() -> Vec<Field<Self>> {
        fields!(EmpModel {
            id: i64 => "ID",
            name: String => "Name",
            sex: bool => "Sex",
            birthday: Option<NaiveDateTime> => "Birthday",
        })
    }
}

impl EmpModel {
    pub fn named(id: i64, prefix: &str) -> Self {
        Self {
            id,
            name: format!("{prefix}{id}"),
            sex: id % 2 == 1,
            birthday: None,
        }
    }
}

/// Option shown in the sex combo box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SexModel {
    pub name: String,
    pub value: bool,
}

impl Model for SexModel {
    const NAME: &'static str = "SexModel";

    fn fields() -> Vec<Field<Self>> {
        fields!(SexModel {
            name: String => "Name",
            value: bool => "Value",
        })
    }
}

impl SexModel {
    pub fn data() -> Vec<SexModel> {
        vec![
            SexModel {
                name: "man".into(),
                value: true,
            },
            SexModel {
                name: "woman".into(),
                value: false,
            },
        ]
    }
}

/// Views that show no model data.
#[derive(Debug, Clone, Default)]
pub struct Blank;

impl Model for Blank {
    const NAME: &'static str = "Blank";

    fn fields() -> Vec<Field<Self>> {
        Vec::new()
    }
}
