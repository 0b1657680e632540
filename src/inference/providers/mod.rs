mod responses;

pub use responses::ResponsesProvider;
