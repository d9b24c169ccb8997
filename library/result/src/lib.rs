use error::GatewayError;

/// An alias of [std::result::Result](std::result::Result) with its error variant
/// pre-populated with a `Box<dyn GatewayError>`.
///
/// Instead of writing...
///
/// ```
/// use error::GatewayError;
///
/// fn greet() -> Result<&'static str, Box<dyn GatewayError>> {
///     Ok("hello")
/// }
/// ```
///
/// ...you can simply say...
///
/// ```
/// use error::GatewayError;
/// use result::Result;
///
/// fn greet() -> Result<&'static str> {
///     Ok("hello")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Box<dyn GatewayError>>;
