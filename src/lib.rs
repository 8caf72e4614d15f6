//! pyjs compiles Python syntax trees, delivered as JSON by an external front-end,
//! into JavaScript that runs on top of the `py_builtins` runtime library.

pub mod backends {
    pub mod js;
}

pub mod build_system {
    pub mod build;
}

pub mod compiler_frontend;

pub mod projects {
    // The compiler CLI
    pub mod cli;
    pub mod settings;
}
