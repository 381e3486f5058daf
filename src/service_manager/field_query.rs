use std::fmt;

/// Server side filter expression sent as the `fieldQuery` parameter of Service Manager list
/// endpoints. Only equality criteria joined by `and` are needed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldQuery {
    criteria: Vec<(String, String)>,
}

impl FieldQuery {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            criteria: vec![(field.into(), value.into())],
        }
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria.push((field.into(), value.into()));
        self
    }
}

impl fmt::Display for FieldQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.criteria.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{field} eq '{value}'")?;
        }
        Ok(())
    }
}
