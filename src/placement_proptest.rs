//! Property-based tests for dependency placement.
//!
//! Placement paths must never collide for distinct dependencies and must be
//! stable across builds.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{encode_dependency_path, placement_path, COLOCATION_DIR};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    /// Components are plain names, `..`, or names containing `%`
    fn component() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z0-9_-]{1,8}",
            Just("..".to_string()),
            "[a-z]{0,3}%[0-9A-F]{2}",
        ]
    }

    fn dependency() -> impl Strategy<Value = PathBuf> {
        (any::<bool>(), prop::collection::vec(component(), 1..5)).prop_map(|(absolute, parts)| {
            let joined = parts.join("/");
            if absolute {
                PathBuf::from(format!("/{}", joined))
            } else {
                PathBuf::from(joined)
            }
        })
    }

    proptest! {
        /// Property: placement is deterministic
        #[test]
        fn placement_is_deterministic(dep in dependency()) {
            prop_assert_eq!(placement_path(&dep), placement_path(&dep));
        }

        /// Property: every placement lives under the colocation directory
        #[test]
        fn placement_is_under_colocation_dir(dep in dependency()) {
            prop_assert!(placement_path(&dep).starts_with(COLOCATION_DIR));
        }

        /// Property: the encoded path never climbs out of its root
        #[test]
        fn encoded_path_is_relative_and_contained(dep in dependency()) {
            let encoded = encode_dependency_path(&dep);
            prop_assert!(encoded.is_relative());
            prop_assert!(encoded
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_))));
        }

        /// Property: distinct dependency paths never share a placement
        #[test]
        fn placement_is_injective(a in dependency(), b in dependency()) {
            // compare component-wise so "a/b" and "a/b/" count as the same path
            let same: bool = a.components().eq(b.components());
            prop_assert_eq!(same, placement_path(&a) == placement_path(&b));
        }
    }

    #[test]
    fn placement_relative_example() {
        assert_eq!(
            placement_path(Path::new("third_party/terraform/vpc")),
            PathBuf::from(".modules/third_party/terraform/vpc")
        );
    }
}
