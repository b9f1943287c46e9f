mod model_loaders;

pub use model_loaders::{
    load_deal_middleware, load_property_middleware, load_task_middleware, load_yacht_middleware,
};
