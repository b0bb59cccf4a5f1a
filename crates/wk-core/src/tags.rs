//! Inline log tag markers.
//!
//! Combat log lines carry `<<kind:value>>` markers that downstream
//! renderers turn into styled spans. The exact shapes are a data contract
//! and must not change.

/// Tag an ability name for styled rendering.
pub fn ability(name: &str) -> String {
    format!("<<ability:{name}>>")
}

/// Tag a status name for styled rendering.
pub fn status(name: &str) -> String {
    format!("<<status:{name}>>")
}

/// Tag a resource name for styled rendering.
pub fn resource(name: &str) -> String {
    format!("<<resource:{name}>>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_shapes() {
        assert_eq!(ability("Infernal Cascade"), "<<ability:Infernal Cascade>>");
        assert_eq!(status("Burn"), "<<status:Burn>>");
        assert_eq!(resource("Chi"), "<<resource:Chi>>");
    }
}
