use proptest::prelude::*;
use sync_fs::NormalizedPath;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));
        prop_assert!(as_str == "/" || !as_str.ends_with('/'));

        // Normalizing twice changes nothing
        let again = NormalizedPath::new(as_str);
        prop_assert_eq!(&path, &again);
    }

    #[test]
    fn test_join_then_file_name(a in "[a-z]{1,8}(/[a-z]{1,8}){0,3}", b in "[a-z]{1,8}") {
        let joined = NormalizedPath::new(&a).join(&b);
        prop_assert_eq!(joined.file_name(), Some(b.as_str()));
        prop_assert_eq!(joined.parent(), Some(NormalizedPath::new(&a)));
        prop_assert!(joined.starts_with(&NormalizedPath::new(&a)));
    }
}
