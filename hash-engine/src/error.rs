quick_error! {
    /// An error from the hash engine.
    ///
    /// `WeakKey` is deliberately not a variant here: per the engine's
    /// contract, a failed entropy read during subkey seeding is a warning,
    /// not a failure, and is only ever surfaced through the logger.
    #[derive(Debug)]
    pub enum Error {
        /// A null/zero-length key, a zero-length value, or a zero initial
        /// bucket count was passed to an operation that requires one.
        InvalidArgument(msg: &'static str) {
            display("invalid argument: {}", msg)
            description("invalid argument")
        }
        /// `get`/`delete` found no OCCUPIED bucket matching the key in
        /// either array.
        NotFound {
            display("key not found")
            description("key not found")
        }
        /// Allocating a bucket array or a key/value copy failed. The
        /// engine's state is unchanged.
        OutOfMemory {
            display("allocation failed")
            description("out of memory")
        }
        /// `put` could not place the key even using a reclaimed tombstone.
        ///
        /// This indicates the resize trigger failed to keep the load factor
        /// in check, or `MAX_BUCKETS` was reached while still under load.
        NoSpace {
            display("no space left to place key in table")
            description("table full")
        }
    }
}
