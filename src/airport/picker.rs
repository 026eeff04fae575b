use crate::flight::route::{Route, RouteError};

use super::catalog::Airport;

/// Origin/destination selection as the user clicks around the map or
/// commits search results.
#[derive(Debug, Clone, Default)]
pub struct RoutePicker {
    from: Option<Airport>,
    to: Option<Airport>,
}

impl RoutePicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(&self) -> Option<&Airport> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&Airport> {
        self.to.as_ref()
    }

    /// Map click: fills origin, then destination, and starts over once both
    /// are set. Clicking the origin again while choosing the destination
    /// also starts over from it.
    pub fn click(&mut self, airport: Airport) {
        match (&self.from, &self.to) {
            (None, _) => self.from = Some(airport),
            (Some(from), None) if from.iata != airport.iata => self.to = Some(airport),
            _ => {
                self.from = Some(airport);
                self.to = None;
            }
        }
    }

    pub fn set_from(&mut self, airport: Option<Airport>) {
        self.from = airport;
    }

    pub fn set_to(&mut self, airport: Option<Airport>) {
        self.to = airport;
    }

    pub fn reset(&mut self) {
        self.from = None;
        self.to = None;
    }

    /// Both ends chosen and distinct.
    pub fn is_ready(&self) -> bool {
        matches!((&self.from, &self.to), (Some(a), Some(b)) if a.iata != b.iata)
    }

    pub fn route(&self) -> Option<Result<Route, RouteError>> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(Route::new(from.clone(), to.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::catalog::tests::sample;

    #[test]
    fn test_click_fills_origin_then_destination() {
        let catalog = sample();
        let mut picker = RoutePicker::new();

        picker.click(catalog.find("JFK").unwrap().clone());
        assert_eq!(picker.from().unwrap().iata, "JFK");
        assert!(picker.to().is_none());
        assert!(!picker.is_ready());

        picker.click(catalog.find("LHR").unwrap().clone());
        assert_eq!(picker.to().unwrap().iata, "LHR");
        assert!(picker.is_ready());
    }

    #[test]
    fn test_click_same_airport_restarts() {
        let catalog = sample();
        let mut picker = RoutePicker::new();
        picker.click(catalog.find("JFK").unwrap().clone());
        picker.click(catalog.find("JFK").unwrap().clone());
        assert_eq!(picker.from().unwrap().iata, "JFK");
        assert!(picker.to().is_none());
    }

    #[test]
    fn test_click_after_complete_route_restarts() {
        let catalog = sample();
        let mut picker = RoutePicker::new();
        picker.click(catalog.find("JFK").unwrap().clone());
        picker.click(catalog.find("LHR").unwrap().clone());
        picker.click(catalog.find("CDG").unwrap().clone());
        assert_eq!(picker.from().unwrap().iata, "CDG");
        assert!(picker.to().is_none());
    }

    #[test]
    fn test_same_airport_route_is_rejected() {
        let catalog = sample();
        let mut picker = RoutePicker::new();
        assert!(picker.route().is_none());

        picker.set_from(Some(catalog.find("CDG").unwrap().clone()));
        picker.set_to(Some(catalog.find("CDG").unwrap().clone()));
        assert!(!picker.is_ready());
        assert!(matches!(
            picker.route(),
            Some(Err(RouteError::DegenerateRoute { .. }))
        ));

        picker.reset();
        assert!(picker.from().is_none() && picker.to().is_none());
    }
}
