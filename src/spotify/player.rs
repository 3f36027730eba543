use crate::{
    error::Result,
    spotify::SpotifyClient,
    types::{Device, DevicesResponse, TrackUrisRequest},
};

impl SpotifyClient {
    /// Lists the devices available for playback via `GET /me/player/devices`.
    pub async fn get_devices(&self) -> Result<Vec<Device>> {
        let url = format!("{base}/me/player/devices", base = self.base_url);
        let response: DevicesResponse = self.send(self.http.get(&url)).await?.json().await?;
        Ok(response.devices)
    }

    /// Starts playing `uris` with `PUT /me/player/play`.
    ///
    /// Without a `device_id` Spotify plays on the currently active device.
    pub async fn start_playback(&self, device_id: Option<&str>, uris: &[String]) -> Result<()> {
        let url = format!("{base}/me/player/play", base = self.base_url);
        let mut request = self.http.put(&url).json(&TrackUrisRequest {
            uris: uris.to_vec(),
        });
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }
        self.send(request).await?;
        Ok(())
    }
}
