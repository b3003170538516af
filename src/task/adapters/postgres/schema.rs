//! Diesel schema for task record persistence.

diesel::table! {
    /// Local mirror of backend task state.
    task_records (id) {
        /// Insertion-ordered surrogate key.
        id -> Int8,
        /// Backend task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Owner type tag.
        #[max_length = 100]
        owner_kind -> Varchar,
        /// Owner record identifier.
        owner_id -> Int8,
        /// Registered job name.
        #[max_length = 255]
        task_name -> Varchar,
        /// Lifecycle state code.
        state -> Int2,
        /// Submission timestamp.
        created_at -> Timestamptz,
        /// Last state change timestamp.
        updated_at -> Timestamptz,
        /// Whether the interface should block on the task.
        ui_block -> Bool,
    }
}
