pub mod brain_model;
