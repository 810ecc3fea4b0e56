//! Creates a pool over static memory and another over `malloc`ed memory,
//! and performs one allocation and one release on each.
use blkpool_capi::{pool_alloc, pool_destroy, pool_free, pool_init};
use libc::c_void;
use std::{mem::size_of, process::exit};

fn main() {
    unsafe {
        // User-provided memory (static)
        static mut MEMORY: [u8; 320] = [0; 320];
        let pool = pool_init(
            core::ptr::addr_of_mut!(MEMORY) as *mut c_void,
            size_of::<u8>(),
            320,
        );
        if pool.is_null() {
            eprintln!("Failed to create memory pool.");
            exit(1);
        }

        let block1 = pool_alloc(pool, 64);
        println!("Allocated block1: {:p}", block1);

        pool_free(pool, block1);
        pool_destroy(pool);

        // User-provided memory (dynamic)
        let memory2 = libc::malloc(size_of::<u8>() * 320);
        let pool2 = pool_init(memory2, size_of::<u8>(), 320);
        if pool2.is_null() {
            eprintln!("Failed to create second memory pool.");
            libc::free(memory2);
            exit(1);
        }

        let block2 = pool_alloc(pool2, 96);
        println!("Allocated block2: {:p}", block2);

        pool_free(pool2, block2);
        pool_destroy(pool2);
        libc::free(memory2);
    }
}
