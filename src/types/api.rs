use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of exported code construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
    Function,
    Class,
    Interface,
    Type,
    Constant,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Constant => "constant",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of a callable element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub param_type: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            optional: false,
            default_value: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.param_type = Some(ty.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self.optional = true;
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.optional && self.default_value.is_none() {
            write!(f, "?")?;
        }
        if let Some(ty) = &self.param_type {
            write!(f, ": {}", ty)?;
        }
        if let Some(default) = &self.default_value {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

/// Where an element was declared
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// A named, typed description of one exported code construct.
///
/// Identity within one parsed version is the `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiElement {
    pub kind: ApiKind,
    pub name: String,
    pub signature: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl ApiElement {
    /// Creates a public element whose signature defaults to its name
    pub fn new(kind: ApiKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            signature: name.clone(),
            name,
            is_public: true,
            parameters: None,
            return_type: None,
            documentation: None,
            location: SourceLocation::default(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(ApiKind::Function, name)
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Parameters, treating an absent list as empty
    pub fn params(&self) -> &[Parameter] {
        self.parameters.as_deref().unwrap_or(&[])
    }
}
