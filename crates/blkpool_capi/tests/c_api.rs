use blkpool::{BlockState, ErrorKind, InitError};
use blkpool_capi::{pool_alloc, pool_destroy, pool_free, pool_init, BlkPool};
use std::{
    os::raw::c_void,
    ptr::{null_mut, NonNull},
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn null_arguments() {
    init_logger();
    let mut memory = [0u8; 64];
    let memory = memory.as_mut_ptr() as *mut c_void;

    unsafe {
        assert!(pool_init(null_mut(), 1, 64).is_null());
        assert!(pool_init(memory, 0, 64).is_null());
        assert!(pool_init(memory, 1, 0).is_null());
        assert!(pool_init(memory, usize::MAX, 2).is_null());

        assert!(pool_alloc(null_mut(), 16).is_null());
        pool_free(null_mut(), memory);
        pool_destroy(null_mut());

        let pool = pool_init(memory, 16, 4);
        assert!(!pool.is_null());
        assert!(pool_alloc(pool, 0).is_null());
        pool_free(pool, null_mut());
        assert_eq!((*pool).get().free_blocks(), 4);
        pool_destroy(pool);
    }
}

#[test]
fn init_failure_reasons() {
    init_logger();
    let mut memory = [0u8; 64];
    let memory = memory.as_mut_ptr() as *mut c_void;

    unsafe {
        let err = |memory, block_size, num_blocks| {
            BlkPool::from_raw_parts(memory, block_size, num_blocks).unwrap_err()
        };
        assert_eq!(err(null_mut(), 1, 64), InitError::NullMemory);
        assert_eq!(err(null_mut(), 0, 0), InitError::NullMemory);
        assert_eq!(InitError::NullMemory.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err(memory, 0, 64), InitError::ZeroBlockSize);
        assert_eq!(err(memory, 1, 0), InitError::ZeroBlockCount);
        assert_eq!(err(memory, usize::MAX, 2), InitError::SizeOverflow);

        let pool = BlkPool::from_raw_parts(memory, 16, 4).unwrap();
        assert_eq!(pool.get().num_blocks(), 4);
    }
}

#[test]
fn example_scenario() {
    init_logger();
    let mut memory = vec![0u8; 320];
    let base = memory.as_mut_ptr() as *mut c_void;

    unsafe {
        let pool: *mut BlkPool = pool_init(base, 1, 320);
        assert!(!pool.is_null());

        let block1 = pool_alloc(pool, 64);
        log::debug!("block1 = {:p}", block1);
        assert_eq!(block1, base);
        assert_eq!((*pool).get().free_blocks(), 256);

        pool_free(pool, block1);
        assert_eq!((*pool).get().free_blocks(), 320);
        assert!((*pool).get().control_table()[..64]
            .iter()
            .all(|s| *s == BlockState::Free));

        let block2 = pool_alloc(pool, 96);
        assert_eq!(block2, base);

        pool_destroy(pool);
    }

    // The memory region outlives the pool and is still ours
    memory[0] = 42;
    assert_eq!(memory[0], 42);
}

#[test]
fn invalid_frees_are_ignored() {
    init_logger();
    let mut memory = [0u8; 128];
    let base = memory.as_mut_ptr() as *mut c_void;

    unsafe {
        let pool = pool_init(base, 16, 8);
        let a = pool_alloc(pool, 40) as *mut u8;
        let _b = pool_alloc(pool, 16);
        assert_eq!((*pool).get().free_blocks(), 4);

        // Interior, misaligned, foreign
        pool_free(pool, a.add(16) as *mut c_void);
        pool_free(pool, a.add(1) as *mut c_void);
        let mut other = 0u8;
        pool_free(pool, &mut other as *mut u8 as *mut c_void);
        assert_eq!((*pool).get().free_blocks(), 4);

        // Double free
        pool_free(pool, a as *mut c_void);
        assert_eq!((*pool).get().free_blocks(), 7);
        pool_free(pool, a as *mut c_void);
        assert_eq!((*pool).get().free_blocks(), 7);

        let ptr = NonNull::new(a).unwrap();
        assert_eq!((*pool).get().allocation_size(ptr), None);

        pool_destroy(pool);
    }
}

#[test]
fn fragmentation() {
    init_logger();
    let mut memory = [0u8; 64];
    let base = memory.as_mut_ptr() as *mut c_void;

    unsafe {
        let pool = pool_init(base, 8, 8);
        let a = pool_alloc(pool, 24);
        let _b = pool_alloc(pool, 8);
        let c = pool_alloc(pool, 24);
        let _d = pool_alloc(pool, 8);
        pool_free(pool, a);
        pool_free(pool, c);

        // 6 free blocks, but the longest run is 3
        assert_eq!((*pool).get().free_blocks(), 6);
        assert!(pool_alloc(pool, 32).is_null());
        assert_eq!((*pool).get().free_blocks(), 6);
        assert_eq!(pool_alloc(pool, 17), a);

        pool_destroy(pool);
    }
}
