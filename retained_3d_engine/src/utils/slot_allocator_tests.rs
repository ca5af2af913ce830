use super::*;

#[test]
fn test_sequential_alloc() {
    let mut ids = SlotAllocator::new();
    assert_eq!(ids.alloc(), 0);
    assert_eq!(ids.alloc(), 1);
    assert_eq!(ids.alloc(), 2);
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_new_is_empty() {
    let ids = SlotAllocator::default();
    assert!(ids.is_empty());
    assert_eq!(ids.high_water_mark(), 0);
    assert!(!ids.is_live(0));
}

#[test]
fn test_free_recycles_last_freed_first() {
    let mut ids = SlotAllocator::new();
    let a = ids.alloc();
    let b = ids.alloc();
    let _c = ids.alloc();
    assert!(ids.free(a));
    assert!(ids.free(b));
    assert_eq!(ids.alloc(), b);
    assert_eq!(ids.alloc(), a);
    assert_eq!(ids.high_water_mark(), 3);
}

#[test]
fn test_double_free_is_rejected() {
    let mut ids = SlotAllocator::new();
    let a = ids.alloc();
    assert!(ids.free(a));
    assert!(!ids.free(a));
    assert!(!ids.free(42));
    assert!(ids.is_empty());
    // The rejected frees did not queue duplicates
    assert_eq!(ids.alloc(), a);
    assert_eq!(ids.alloc(), 1);
}

#[test]
fn test_is_live_tracks_state() {
    let mut ids = SlotAllocator::new();
    let a = ids.alloc();
    assert!(ids.is_live(a));
    ids.free(a);
    assert!(!ids.is_live(a));
}
