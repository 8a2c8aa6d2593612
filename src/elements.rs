use serde::Serialize;

/// An input the orchestrator's UI has to collect for this source-control
/// plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub tag: &'static str,
    #[serde(rename = "fieldType")]
    pub field_type: &'static str,
    pub name: &'static str,
    #[serde(rename = "placeHolder")]
    pub placeholder: &'static str,
}

/// Repository URL and branch, in display order.
pub const FORM_ELEMENTS: [FieldDescriptor; 2] = [
    FieldDescriptor {
        tag: "Url",
        field_type: "text",
        name: "scmUrl",
        placeholder: "https://github.com/fishin/bobber",
    },
    FieldDescriptor {
        tag: "Branch",
        field_type: "text",
        name: "scmBranch",
        placeholder: "master",
    },
];
