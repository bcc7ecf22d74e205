//! Registering two shared-memory regions under the same name is fatal
//! immediately, before any pipeline is even built.

use sgn_subprocess::{ShmRoster, SubprocessError};

#[test]
fn duplicate_region_name_is_rejected_up_front() {
    let roster = ShmRoster::new();
    roster.to_shm("lookup-table", b"v1").unwrap();

    let result = roster.to_shm("lookup-table", b"v2-should-not-replace-v1");
    assert!(matches!(result, Err(SubprocessError::ShmNameCollision(name)) if name == "lookup-table"));

    // the original registration is untouched
    let region = roster.get("lookup-table").unwrap();
    assert_eq!(region.as_slice(), b"v1");
}
