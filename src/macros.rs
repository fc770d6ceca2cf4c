// src/macros.rs
#[macro_export]
macro_rules! s {
    // Empty
    () => {
        ::std::string::String::new()
    };
    // Anything String::from accepts
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // Concatenate into one owned String.
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

#[macro_export]
macro_rules! pairs {
    // Owned key/value list for query strings, forms and headers.
    ($($k:expr => $v:expr),* $(,)?) => {
        vec![$( (::std::string::String::from($k), ::std::string::String::from($v)) ),*]
    };
}
