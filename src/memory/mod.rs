mod exp;
mod model;

pub use exp::Transition;
pub use model::DynaQModel;
