#[cfg(feature = "tracing")]
macro_rules! dwtrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "datawindow_loader", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dwtrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! dwdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "datawindow_loader", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dwdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! dwwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "datawindow_loader", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! dwwarn {
    ($($tt:tt)*) => {};
}
