pub mod id;
pub mod post;
pub mod task;
pub mod task_list;
