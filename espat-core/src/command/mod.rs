pub mod completion;
pub mod descriptor;
